// CSV worksheet: one file per worksheet under a directory

use super::{Row, RowStore};
use crate::error::StoreError;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct CsvRowStore {
    path: PathBuf,
    // Serializes appends from concurrent requests
    write_lock: Mutex<()>,
}

impl CsvRowStore {
    /// Worksheet `<dir>/<worksheet>.csv`
    pub fn new(dir: &Path, worksheet: &str) -> Self {
        CsvRowStore {
            path: dir.join(format!("{}.csv", worksheet)),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, cells: &[String]) -> Result<(), StoreError> {
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(cells)?;
        writer.flush()?;
        Ok(())
    }
}

impl RowStore for CsvRowStore {
    fn ensure_initialized(&self, header: &[String]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let is_empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if is_empty {
            self.write(header)?;
        }
        Ok(())
    }

    fn append_row(&self, cells: &[String]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.write(cells)
    }

    fn read_all_rows(&self) -> Result<Vec<Row>, StoreError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        // Out-of-band edits may leave non-UTF-8 cells; decode them lossily
        let mut rows = Vec::new();
        for result in rdr.byte_records() {
            let record = result?;
            rows.push(
                record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect(),
            );
        }
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
