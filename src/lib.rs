// Expense Ledger - Core Library
// WhatsApp expense commands -> worksheet rows -> day/month totals.
// Exposes all modules for use in CLI, webhook server, and tests

pub mod aggregator;
pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod record;
pub mod reply;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use aggregator::{aggregate, aggregate_sheet, category_breakdown, CategoryTotal, TargetDate, Totals};
pub use command::{parse_amount, parse_command, Command, SummaryScope};
pub use config::{AliasTable, Config, StoreBackend};
pub use error::{LedgerError, ParseError, StoreError, USAGE_HINT};
pub use ledger::{Ledger, Outcome, SummaryReport};
pub use record::{ExpenseRecord, HEADER};
pub use reply::{render, twiml};
pub use store::{CsvRowStore, MemoryRowStore, RowStore, SqliteRowStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
