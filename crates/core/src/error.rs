//! Error taxonomy for the scoring core.
//!
//! Most of these never reach a caller: missing sources degrade to empty sets and
//! malformed records are skipped during ingestion. They exist so the degradation
//! points can log precisely what happened.

use std::path::PathBuf;

/// Errors raised by corpus ingestion, catalog loading and query validation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A data file (corpus, exclusion list, SDG catalog) does not exist.
    #[error("source not found: {0}")]
    SourceMissing(PathBuf),

    /// A single corpus record could not be admitted.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Reading or writing a data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A whole data file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Caller input violates the query contract.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result alias used across the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
