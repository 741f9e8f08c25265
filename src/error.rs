//! Error types for corpus construction and scoring.

use thiserror::Error;

/// Main error type for corpus operations.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Missing column '{column}' (bound to {role}) in input table")]
    MissingColumn { column: String, role: &'static str },

    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("No name token could be extracted from '{0}'")]
    NameParse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;
