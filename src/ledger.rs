// 📒 Ledger Service
// One inbound message -> parse -> append or read+aggregate -> typed outcome

use crate::aggregator::{aggregate, category_breakdown, CategoryTotal, TargetDate, Totals};
use crate::command::{parse_command, Command, SummaryScope};
use crate::config::{AliasTable, Config};
use crate::error::LedgerError;
use crate::record::{header_row, ExpenseRecord};
use crate::store::{Row, RowStore};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub scope: SummaryScope,
    pub person: Option<String>,
    pub date: TargetDate,
    pub totals: Totals,
    /// Month breakdown; empty for `hoy`
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recorded(ExpenseRecord),
    Summary(SummaryReport),
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct Ledger {
    store: Arc<dyn RowStore>,
    aliases: AliasTable,
    initialized: OnceLock<()>,
}

impl Ledger {
    pub fn new(store: Arc<dyn RowStore>, aliases: AliasTable) -> Self {
        Ledger {
            store,
            aliases,
            initialized: OnceLock::new(),
        }
    }

    /// Open the configured backend; the worksheet is created on first use
    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        let store = config.store.open(&config.worksheet)?;
        Ok(Self::new(store, config.aliases.clone()))
    }

    /// Create the worksheet and header if missing. Runs the backend check
    /// once per process; later calls return immediately.
    pub fn ensure_initialized(&self) -> Result<(), LedgerError> {
        if self.initialized.get().is_some() {
            return Ok(());
        }

        self.store.ensure_initialized(&header_row()).map_err(|e| {
            warn!(store = %self.store.describe(), error = %e, "worksheet initialization failed");
            e
        })?;

        if self.initialized.set(()).is_ok() {
            info!(store = %self.store.describe(), "worksheet ready");
        }
        Ok(())
    }

    pub fn handle_message(&self, text: &str, sender: &str) -> Result<Outcome, LedgerError> {
        self.handle_message_at(text, sender, Local::now().naive_local())
    }

    /// Same as [`Ledger::handle_message`] with an explicit local clock reading
    pub fn handle_message_at(
        &self,
        text: &str,
        sender: &str,
        now: NaiveDateTime,
    ) -> Result<Outcome, LedgerError> {
        let command = parse_command(text).map_err(|e| {
            debug!(text, "unparseable message");
            e
        })?;
        debug!(?command, sender, "parsed command");

        match command {
            Command::RecordExpense {
                amount,
                category,
                description,
            } => {
                let who = self.aliases.resolve(sender);
                let record = ExpenseRecord::new(now, amount, &category, &description, who);
                self.record(&record)?;
                Ok(Outcome::Recorded(record))
            }
            Command::Summarize { scope, person } => {
                let report = self.summarize_at(scope, person, now)?;
                Ok(Outcome::Summary(report))
            }
        }
    }

    /// Append one expense row
    pub fn record(&self, record: &ExpenseRecord) -> Result<(), LedgerError> {
        self.ensure_initialized()?;
        self.store.append_row(&record.to_row())?;

        info!(
            amount = record.amount,
            category = %record.category,
            who = %record.who,
            "expense recorded"
        );
        Ok(())
    }

    /// Totals for the local date of `now`
    pub fn summarize_at(
        &self,
        scope: SummaryScope,
        person: Option<String>,
        now: NaiveDateTime,
    ) -> Result<SummaryReport, LedgerError> {
        let rows = self.data_rows()?;
        let date = TargetDate::from(now.date());
        let filter = person.as_deref();

        let totals = aggregate(&rows, date, filter);
        let categories = match scope {
            SummaryScope::Today => Vec::new(),
            SummaryScope::Month | SummaryScope::Full => category_breakdown(&rows, date, filter),
        };

        debug!(?scope, ?person, day = totals.day, month = totals.month, "summary computed");

        Ok(SummaryReport {
            scope,
            person,
            date,
            totals,
            categories,
        })
    }

    pub fn summarize(
        &self,
        scope: SummaryScope,
        person: Option<String>,
    ) -> Result<SummaryReport, LedgerError> {
        self.summarize_at(scope, person, Local::now().naive_local())
    }

    /// Every well-formed stored expense, in insertion order
    pub fn expenses(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        let rows = self.data_rows()?;
        Ok(rows.iter().filter_map(|row| ExpenseRecord::from_row(row)).collect())
    }

    /// Worksheet rows without the header
    fn data_rows(&self) -> Result<Vec<Row>, LedgerError> {
        self.ensure_initialized()?;
        let mut rows = self.store.read_all_rows()?;
        if !rows.is_empty() {
            rows.remove(0);
        }
        Ok(rows)
    }
}
