//! # sopindex-core
//!
//! Retrieval and version resolution for standard operating procedure (SOP)
//! documents. A persisted embedding index is loaded once, searched by cosine
//! similarity, and the scored candidates are collapsed to a single current
//! revision per document before they reach an answer generator.
//!
//! The crate is fully synchronous with no async runtime. Embedding and text
//! generation are external collaborators reached through the traits in
//! [`provider`].
//!
//! ## Architecture
//!
//! ```text
//! query text → EmbeddingProvider → query vector
//!            → search::similarity_search (VectorIndex, top-k)
//!            → resolve::VersionResolver (one record per SOP id)
//!            → AnswerGenerator
//! Persistence: embeddings.bin (bincode + CRC32) + metadata.json
//! ```

/// Global configuration constants: artifact names, defaults, and provider settings.
pub mod config;
/// Core record type shared by the index, search, and resolver.
pub mod document;
/// Error taxonomy and crate-wide `Result` alias.
pub mod error;
/// In-memory vector index built from persisted artifacts, plus vector math.
pub mod index;
/// SOP text ingestion and offline index rebuilding.
pub mod ingest;
/// Query pipeline wiring retrieval, resolution, and generation together.
pub mod pipeline;
/// External collaborator boundaries: embedding and answer generation.
pub mod provider;
/// Version resolution: comparator cascade and per-family selection.
pub mod resolve;
/// Brute-force cosine similarity search with stable top-k selection.
pub mod search;
/// Disk persistence for index artifacts with atomic writes and CRC32 checks.
pub mod storage;

pub use document::DocumentRecord;
pub use error::{Result, SopError};
pub use index::VectorIndex;
pub use pipeline::{Answer, QueryPipeline, RetrievalService};
pub use resolve::VersionResolver;
pub use search::similarity_search;
