//! The read-only vector index.

use std::path::Path;

use crate::document::DocumentRecord;
use crate::error::{Result, SopError};
use crate::index::distance::normalize_in_place;
use crate::storage::{load_index_artifacts, EmbeddingMatrix};

/// Unit-normalized embedding matrix paired with its metadata records.
///
/// Row `i` of the matrix is the embedding of `records()[i]`. Construction
/// validates that both sides have the same length; afterwards the index is
/// immutable, so one instance can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    /// Row-major normalized vectors, `len() * dimension` values.
    vectors: Vec<f32>,
    records: Vec<DocumentRecord>,
}

impl VectorIndex {
    /// Loads and validates the persisted artifacts in `dir`.
    ///
    /// Fails with [`SopError::IndexNotFound`] when either artifact is missing
    /// and [`SopError::IndexCorruption`] when they disagree or fail checks.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let (matrix, records) = load_index_artifacts(dir)?;
        let index = Self::from_matrix(matrix, records)?;
        tracing::info!(
            "Loaded index from {:?} ({} records, dimension {})",
            dir,
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    /// Builds an index from an embedding matrix and its metadata.
    pub fn from_matrix(matrix: EmbeddingMatrix, records: Vec<DocumentRecord>) -> Result<Self> {
        matrix.validate().map_err(SopError::IndexCorruption)?;
        if matrix.rows != records.len() {
            return Err(SopError::IndexCorruption(format!(
                "metadata count ({}) does not match embedding count ({})",
                records.len(),
                matrix.rows
            )));
        }

        let EmbeddingMatrix {
            dimension,
            data: mut vectors,
            ..
        } = matrix;
        if dimension > 0 {
            for row in vectors.chunks_exact_mut(dimension) {
                normalize_in_place(row);
            }
        }

        let records = records
            .into_iter()
            .map(|mut record| {
                record.score = None;
                record
            })
            .collect();

        Ok(Self {
            dimension,
            vectors,
            records,
        })
    }

    /// Builds an index from per-record vectors. Every row must have the same width.
    pub fn from_parts(vectors: Vec<Vec<f32>>, records: Vec<DocumentRecord>) -> Result<Self> {
        let matrix = EmbeddingMatrix::from_rows(&vectors).map_err(SopError::IndexCorruption)?;
        Self::from_matrix(matrix, records)
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Width of every stored vector (0 for an empty index).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The normalized vector of row `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn vector(&self, i: usize) -> &[f32] {
        let start = i * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Iterates the normalized vectors in corpus order.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.vectors.chunks(self.dimension.max(1))
    }

    /// The metadata sequence, parallel to [`vectors`](Self::vectors).
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }
}
