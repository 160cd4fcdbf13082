//! Query pipeline: retrieval, version resolution, and answer generation.
//!
//! Services are plain values built by the caller: the index is shared
//! through an `Arc`, providers are injected as trait objects. Nothing here
//! caches state between calls, so one pipeline can serve concurrent queries.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{DEFAULT_CANDIDATE_K, NO_EVIDENCE_ANSWER};
use crate::document::DocumentRecord;
use crate::error::{Result, SopError};
use crate::index::VectorIndex;
use crate::provider::{AnswerGenerator, EmbeddingProvider};
use crate::resolve::VersionResolver;
use crate::search::similarity_search;

/// Rejects empty or whitespace-only query text.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SopError::InvalidQuery("query must not be empty".into()));
    }
    Ok(())
}

/// Embeds queries and ranks the shared index against them.
#[derive(Clone)]
pub struct RetrievalService {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RetrievalService {
    /// Creates a retrieval service over a loaded index.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    /// The underlying index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Returns the top `k` records for `query`, best first, each with a score.
    ///
    /// A blank query fails with [`SopError::InvalidQuery`] before the
    /// embedding provider is called.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentRecord>> {
        validate_query(query)?;
        let vector = self.embedder.embed(query)?;
        similarity_search(&self.index, &vector, k)
    }
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Generated answer, or the fixed no-evidence reply.
    pub text: String,
    /// Resolved evidence the answer was grounded on.
    pub evidence: Vec<DocumentRecord>,
    /// How many scored candidates retrieval returned before resolution.
    pub candidates_considered: usize,
    /// `false` when the generator was skipped for lack of evidence.
    pub generated: bool,
}

/// Retrieve → resolve → generate.
pub struct QueryPipeline {
    retrieval: RetrievalService,
    resolver: VersionResolver,
    generator: Arc<dyn AnswerGenerator>,
    candidate_k: usize,
}

impl QueryPipeline {
    /// Creates a pipeline with the default resolver cascade and candidate count.
    pub fn new(retrieval: RetrievalService, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            retrieval,
            resolver: VersionResolver::default(),
            generator,
            candidate_k: DEFAULT_CANDIDATE_K,
        }
    }

    /// Replaces the version resolver.
    pub fn with_resolver(mut self, resolver: VersionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets how many candidates are retrieved before resolution.
    pub fn with_candidate_k(mut self, k: usize) -> Self {
        self.candidate_k = k;
        self
    }

    /// The retrieval stage.
    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// Retrieves candidates and resolves them to one record per SOP.
    ///
    /// Returns the candidate count alongside the resolved evidence.
    pub fn evidence(&self, query: &str) -> Result<(usize, Vec<DocumentRecord>)> {
        let candidates = self.retrieval.retrieve(query, self.candidate_k)?;
        let evidence = self.resolver.resolve(&candidates);
        Ok((candidates.len(), evidence))
    }

    /// Runs the full pipeline for one query.
    ///
    /// When resolution leaves no evidence the generator is not called and
    /// the fixed no-evidence answer is returned instead.
    pub fn answer(&self, query: &str) -> Result<Answer> {
        let (candidates_considered, evidence) = self.evidence(query)?;
        tracing::info!(
            "Retrieved {} candidates, {} after version resolution",
            candidates_considered,
            evidence.len()
        );

        if evidence.is_empty() {
            return Ok(Answer {
                text: NO_EVIDENCE_ANSWER.to_string(),
                evidence,
                candidates_considered,
                generated: false,
            });
        }

        let text = self.generator.generate(query, &evidence)?;
        Ok(Answer {
            text,
            evidence,
            candidates_considered,
            generated: true,
        })
    }
}
