// SQLite worksheet: rows kept as JSON cell arrays, ordered by insertion

use super::{Row, RowStore};
use crate::error::StoreError;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteRowStore {
    conn: Mutex<Connection>,
    worksheet: String,
}

impl SqliteRowStore {
    pub fn open(db_path: &Path, worksheet: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self::from_connection(conn, worksheet))
    }

    pub fn open_in_memory(worksheet: &str) -> Result<Self, StoreError> {
        Ok(Self::from_connection(Connection::open_in_memory()?, worksheet))
    }

    fn from_connection(conn: Connection, worksheet: &str) -> Self {
        SqliteRowStore {
            conn: Mutex::new(conn),
            worksheet: worksheet.to_string(),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn insert(conn: &Connection, worksheet: &str, cells: &[String]) -> Result<(), StoreError> {
        conn.execute(
            "INSERT INTO sheet_rows (worksheet, cells) VALUES (?1, ?2)",
            params![worksheet, serde_json::to_string(cells)?],
        )?;
        Ok(())
    }
}

impl RowStore for SqliteRowStore {
    fn ensure_initialized(&self, header: &[String]) -> Result<(), StoreError> {
        let mut conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sheet_rows (
                position INTEGER PRIMARY KEY AUTOINCREMENT,
                worksheet TEXT NOT NULL,
                cells TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sheet_rows_worksheet ON sheet_rows(worksheet, position)",
            [],
        )?;

        // Existence check and header seed commit together
        let tx = conn.transaction()?;
        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM sheet_rows WHERE worksheet = ?1",
            params![self.worksheet],
            |row| row.get(0),
        )?;
        if existing == 0 {
            Self::insert(&tx, &self.worksheet, header)?;
        }
        tx.commit()?;

        Ok(())
    }

    fn append_row(&self, cells: &[String]) -> Result<(), StoreError> {
        let conn = self.conn()?;
        Self::insert(&conn, &self.worksheet, cells)
    }

    fn read_all_rows(&self) -> Result<Vec<Row>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT cells FROM sheet_rows
             WHERE worksheet = ?1
             ORDER BY position ASC",
        )?;

        let encoded = stmt
            .query_map(params![self.worksheet], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let rows = encoded
            .iter()
            .map(|json| serde_json::from_str::<Row>(json))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.worksheet)
    }
}
