//! External collaborator boundaries.
//!
//! The core never computes embeddings or writes answers itself. It calls
//! these traits, whose implementations (HTTP clients, local models, test
//! doubles) are constructed by the caller and injected into the pipeline.

use crate::document::DocumentRecord;
use crate::error::Result;

/// Turns text into a fixed-width embedding vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Embeds a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds several texts, preserving input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Writes a natural-language answer grounded on resolved evidence.
///
/// `evidence` holds at most one record per document id, best score first.
pub trait AnswerGenerator: Send + Sync {
    /// Generates the answer text for `query`.
    fn generate(&self, query: &str, evidence: &[DocumentRecord]) -> Result<String>;
}
