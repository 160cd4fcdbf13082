//! Search primitives: brute-force cosine similarity with stable top-k selection.

/// Exact similarity search over a [`VectorIndex`](crate::index::VectorIndex).
pub mod similarity;

pub use similarity::similarity_search;
