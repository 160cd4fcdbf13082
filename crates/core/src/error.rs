//! Error taxonomy for the retrieval core.
//!
//! Structural and configuration errors abort the current operation and are
//! surfaced as-is. Malformed dates and versions inside version resolution are
//! not errors at all: they are absorbed by the comparator cascade.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for index loading, search, ingestion, and provider failures.
#[derive(Debug, Error)]
pub enum SopError {
    /// Required credentials or settings are absent.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A persisted index artifact does not exist.
    #[error("index artifact not found: {}", path.display())]
    IndexNotFound { path: PathBuf },
    /// Persisted artifacts exist but are structurally inconsistent.
    #[error("index corrupted: {0}")]
    IndexCorruption(String),
    /// Empty or blank query text.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// Search was attempted against an index with no vectors.
    #[error("index contains no vectors")]
    EmptyIndex,
    /// Query vector width differs from the indexed vectors.
    #[error("query dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// The embedding or generation collaborator failed.
    #[error("provider error: {0}")]
    Provider(String),
    /// Raw SOP sources could not be read into records.
    #[error("ingestion error: {0}")]
    Ingestion(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SopError>;
