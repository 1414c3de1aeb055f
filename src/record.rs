// 🧾 Expense Record - one spreadsheet row per recorded expense

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Header row, exact column order of the worksheet
pub const HEADER: [&str; 8] = [
    "fecha_hora",
    "año",
    "mes",
    "dia",
    "monto",
    "categoria",
    "descripcion",
    "quien",
];

/// Timestamp format written to the `fecha_hora` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Column positions
pub const COL_TIMESTAMP: usize = 0;
pub const COL_YEAR: usize = 1;
pub const COL_MONTH: usize = 2;
pub const COL_DAY: usize = 3;
pub const COL_AMOUNT: usize = 4;
pub const COL_CATEGORY: usize = 5;
pub const COL_DESCRIPTION: usize = 6;
pub const COL_WHO: usize = 7;

/// Columns a row needs before it can take part in a sum
pub const MIN_ROW_LEN: usize = COL_AMOUNT + 1;

/// Immutable once appended. Year/month/day always come from `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub timestamp: NaiveDateTime,
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub who: String,
}

impl ExpenseRecord {
    /// Create a record; the category is stored lower-cased
    pub fn new(
        timestamp: NaiveDateTime,
        amount: i64,
        category: &str,
        description: &str,
        who: &str,
    ) -> Self {
        ExpenseRecord {
            timestamp,
            amount,
            category: category.to_lowercase(),
            description: description.to_string(),
            who: who.to_string(),
        }
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn day(&self) -> u32 {
        self.timestamp.day()
    }

    /// Cells in `HEADER` order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.year().to_string(),
            self.month().to_string(),
            self.day().to_string(),
            self.amount.to_string(),
            self.category.clone(),
            self.description.clone(),
            self.who.clone(),
        ]
    }

    /// Rebuild a record from stored cells.
    ///
    /// Returns `None` for short rows, unparseable timestamps or amounts.
    /// The timestamp column is the source of truth; the denormalized
    /// year/month/day cells are not consulted here.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < MIN_ROW_LEN {
            return None;
        }

        let timestamp =
            NaiveDateTime::parse_from_str(row[COL_TIMESTAMP].trim(), TIMESTAMP_FORMAT).ok()?;
        let amount = row[COL_AMOUNT].trim().parse::<i64>().ok()?;
        let cell = |idx: usize| row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();

        Some(ExpenseRecord {
            timestamp,
            amount,
            category: cell(COL_CATEGORY),
            description: cell(COL_DESCRIPTION),
            who: cell(COL_WHO),
        })
    }
}

/// Header as owned cells, for stores that take `Vec<String>`
pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|s| s.to_string()).collect()
}
