// 🗄️ Row Store - the spreadsheet-like collaborator
// One header row followed by an append-only sequence of data rows

use crate::error::StoreError;

pub mod csv_store;
pub mod memory;
pub mod sqlite;

pub use csv_store::CsvRowStore;
pub use memory::MemoryRowStore;
pub use sqlite::SqliteRowStore;

pub type Row = Vec<String>;

/// Worksheet-shaped storage. Calls are synchronous and may block.
pub trait RowStore: Send + Sync {
    /// Create the worksheet and seed `header` if it does not exist yet.
    /// Idempotent: an existing worksheet is left untouched.
    fn ensure_initialized(&self, header: &[String]) -> Result<(), StoreError>;

    /// Append one data row after the last existing row
    fn append_row(&self, cells: &[String]) -> Result<(), StoreError>;

    /// Every row, header first, in insertion order
    fn read_all_rows(&self) -> Result<Vec<Row>, StoreError>;

    /// Backend name for logs
    fn describe(&self) -> String;
}
