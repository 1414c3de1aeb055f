// ⚠️ Error taxonomy
// User mistakes, backend faults and bad configuration stay distinguishable

use thiserror::Error;

/// Usage hint shown whenever a line cannot be classified
pub const USAGE_HINT: &str =
    "Usá: gasto <monto> <categoria> [detalle]. Ej: gasto 10000 supermercado. \
     También: hoy, mes, resumen [persona]";

// ============================================================================
// PARSE ERRORS (user-facing, never logged as faults)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unknown keyword, missing tokens or empty message
    #[error("No entendí el mensaje.")]
    Usage,

    /// Amount token is not a whole number with optional thousands separators
    #[error("Monto inválido: \"{0}\".")]
    InvalidAmount(String),

    /// `hoy` / `mes` followed by extra words
    #[error("\"{keyword}\" no lleva argumentos.")]
    UnexpectedArguments { keyword: String },
}

impl ParseError {
    /// Message plus usage hint, as shown to the sender
    pub fn user_message(&self) -> String {
        format!("{} {}", self, USAGE_HINT)
    }
}

// ============================================================================
// STORE ERRORS (backend faults)
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("row encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another request panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,

    /// The blocking task running the store call did not finish
    #[error("background task failed: {0}")]
    Task(String),
}

// ============================================================================
// TOP-LEVEL
// ============================================================================

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// True when the user can fix the problem by rewording the message
    pub fn is_user_error(&self) -> bool {
        matches!(self, LedgerError::Parse(_))
    }
}
