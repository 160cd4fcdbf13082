//! In-memory vector index over persisted SOP embeddings.
//!
//! Vectors are normalized to unit length once at construction so that cosine
//! similarity at query time is a plain dot product. The index holds the
//! normalized matrix in a single contiguous row-major buffer next to the
//! parallel metadata sequence, and is never mutated after construction.

/// Vector math: dot product, L2 norm, and epsilon-guarded normalization.
pub mod distance;
/// The loaded, read-only `VectorIndex`.
pub mod vector_index;

pub use distance::{dot_product, l2_norm, normalize_in_place, normalized};
pub use vector_index::VectorIndex;
