// ⚙️ Configuration - built once at process start, passed by reference

use crate::error::LedgerError;
use crate::store::{CsvRowStore, MemoryRowStore, RowStore, SqliteRowStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_WORKSHEET: &str = "Movimientos";
pub const DEFAULT_STORE: &str = "sqlite:gastos.db";

// ============================================================================
// ALIAS TABLE
// ============================================================================

/// Raw channel address -> display name. Read-only after startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable(HashMap<String, String>);

impl AliasTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        AliasTable(entries)
    }

    /// Parse a JSON object such as `{"whatsapp:+5491100000000": "Facu"}`
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json)
            .map_err(|e| LedgerError::Config(format!("invalid alias table: {}", e)))
    }

    /// Display name for `sender`, or the raw identity when unmapped
    pub fn resolve<'a>(&'a self, sender: &'a str) -> &'a str {
        self.0.get(sender).map(String::as_str).unwrap_or(sender)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// STORE BACKEND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    /// Directory holding `<worksheet>.csv`
    Csv(PathBuf),
    /// SQLite database file
    Sqlite(PathBuf),
}

impl StoreBackend {
    /// `memory:`, `csv:<dir>` or `sqlite:<path>`
    pub fn parse(value: &str) -> Result<Self, LedgerError> {
        let (kind, location) = value.split_once(':').unwrap_or((value, ""));
        let location = location.trim();

        let need_location = |kind: &str| {
            if location.is_empty() {
                Err(LedgerError::Config(format!("store '{}' needs a path", kind)))
            } else {
                Ok(PathBuf::from(location))
            }
        };

        match kind.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "csv" => Ok(StoreBackend::Csv(need_location("csv")?)),
            "sqlite" => Ok(StoreBackend::Sqlite(need_location("sqlite")?)),
            other => Err(LedgerError::Config(format!(
                "unknown store backend '{}' (expected memory:, csv:<dir> or sqlite:<path>)",
                other
            ))),
        }
    }

    /// Open the backend for `worksheet`. Does not create the worksheet.
    pub fn open(&self, worksheet: &str) -> Result<Arc<dyn RowStore>, LedgerError> {
        let store: Arc<dyn RowStore> = match self {
            StoreBackend::Memory => Arc::new(MemoryRowStore::new()),
            StoreBackend::Csv(dir) => Arc::new(CsvRowStore::new(dir, worksheet)),
            StoreBackend::Sqlite(path) => Arc::new(SqliteRowStore::open(path, worksheet)?),
        };
        Ok(store)
    }
}

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub store: StoreBackend,
    pub worksheet: String,
    pub aliases: AliasTable,
}

impl Config {
    /// Read `LEDGER_*` variables from the process environment
    pub fn from_env() -> Result<Self, LedgerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the environment)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LedgerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = non_empty("LEDGER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let store = StoreBackend::parse(
            &non_empty("LEDGER_STORE").unwrap_or_else(|| DEFAULT_STORE.to_string()),
        )?;
        let worksheet = non_empty("LEDGER_WORKSHEET").unwrap_or_else(|| DEFAULT_WORKSHEET.to_string());

        let aliases = match (non_empty("LEDGER_ALIASES"), non_empty("LEDGER_ALIASES_FILE")) {
            (Some(inline), _) => AliasTable::from_json(&inline)?,
            (None, Some(path)) => {
                let json = fs::read_to_string(&path).map_err(|e| {
                    LedgerError::Config(format!("cannot read alias file {}: {}", path, e))
                })?;
                AliasTable::from_json(&json)?
            }
            (None, None) => AliasTable::default(),
        };

        Ok(Config {
            bind_addr,
            store,
            worksheet,
            aliases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.worksheet, "Movimientos");
        assert_eq!(config.store, StoreBackend::Sqlite(PathBuf::from("gastos.db")));
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_inline_aliases() {
        let config = Config::from_lookup(lookup_from(&[
            ("LEDGER_STORE", "memory:"),
            ("LEDGER_ALIASES", r#"{"whatsapp:+123": "Facu"}"#),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.aliases.resolve("whatsapp:+123"), "Facu");
        assert_eq!(config.aliases.resolve("whatsapp:+999"), "whatsapp:+999");
    }

    #[test]
    fn test_bad_alias_json_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[("LEDGER_ALIASES", "[1, 2]")])).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn test_missing_alias_file_is_config_error() {
        let err = Config::from_lookup(lookup_from(&[(
            "LEDGER_ALIASES_FILE",
            "/definitely/not/here.json",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("alias file"));
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!(StoreBackend::parse("memory:").unwrap(), StoreBackend::Memory);
        assert_eq!(
            StoreBackend::parse("csv:/tmp/gastos").unwrap(),
            StoreBackend::Csv(PathBuf::from("/tmp/gastos"))
        );
        assert!(StoreBackend::parse("sqlite:").is_err());
        assert!(StoreBackend::parse("sheets:abc").is_err());
    }
}
