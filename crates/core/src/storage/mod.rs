//! Storage layer: persisted index artifacts.
//!
//! An index lives in a directory holding two side-by-side artifacts: a
//! bincode embedding matrix with a CRC32 footer, and a JSON metadata array.
//! Both are written atomically (temp file + rename) by the offline build.

/// Artifact save/load with atomic writes and integrity checks.
pub mod persistence;

pub use persistence::{load_index_artifacts, save_index, EmbeddingMatrix};
