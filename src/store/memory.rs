use super::{Row, RowStore};
use crate::error::StoreError;
use std::sync::Mutex;

/// In-process worksheet, lost on exit
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    rows: Mutex<Vec<Row>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows (header included)
    pub fn with_rows(rows: Vec<Row>) -> Self {
        MemoryRowStore {
            rows: Mutex::new(rows),
        }
    }
}

impl RowStore for MemoryRowStore {
    fn ensure_initialized(&self, header: &[String]) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::Poisoned)?;
        if rows.is_empty() {
            rows.push(header.to_vec());
        }
        Ok(())
    }

    fn append_row(&self, cells: &[String]) -> Result<(), StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .push(cells.to_vec());
        Ok(())
    }

    fn read_all_rows(&self) -> Result<Vec<Row>, StoreError> {
        Ok(self.rows.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
