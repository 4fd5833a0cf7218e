//! Error types for tlc-ingest

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Main error type for tlc-ingest
///
/// Every variant is fatal for the run it occurs in; nothing here is
/// recovered locally.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Decompression error: {0}")]
    Decompress(String),

    #[error("Cannot coerce {value:?} in column {column} (line {line}) to {expected}")]
    TypeCoercion {
        column: String,
        line: u64,
        value: String,
        expected: &'static str,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl IngestError {
    /// Configuration error from anything displayable
    pub fn config(msg: impl Into<String>) -> Self {
        IngestError::Config(msg.into())
    }

    /// Fetch error from anything displayable
    pub fn fetch(msg: impl Into<String>) -> Self {
        IngestError::Fetch(msg.into())
    }
}
