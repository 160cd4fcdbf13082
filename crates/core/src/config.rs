//! Global configuration constants for sopindex.
//!
//! Compile-time defaults live here; runtime overrides are handled via CLI
//! arguments and environment variables in the `sopindex` binary.

/// Default directory holding the persisted index artifacts.
pub const DEFAULT_INDEX_DIR: &str = "./data/index";

/// Default directory scanned for raw SOP files during an index build.
pub const DEFAULT_SOURCE_DIR: &str = "./data/sop_raw";

/// File name of the embedding matrix artifact.
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";

/// File name of the metadata artifact (JSON array of records).
pub const METADATA_FILE: &str = "metadata.json";

/// Extension of raw SOP source files picked up by ingestion.
pub const SOP_FILE_EXTENSION: &str = "md";

/// Magic bytes written before the CRC32 footer of the embedding artifact.
pub const EMBEDDINGS_CRC_MAGIC: &[u8; 4] = b"SVE1";

/// Added to every vector norm before dividing, so zero vectors normalize to zero.
pub const NORM_EPSILON: f32 = 1e-10;

/// Default number of results returned by a plain search.
pub const DEFAULT_SEARCH_K: usize = 5;

/// Default number of candidates retrieved before version resolution.
///
/// Larger than [`DEFAULT_SEARCH_K`] so several revisions of the same SOP
/// can surface and still leave room for distinct documents after collapsing.
pub const DEFAULT_CANDIDATE_K: usize = 8;

/// Accepted `effective_date` formats, tried in order.
pub const ACCEPTED_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Default base URL of the OpenAI-compatible provider.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default chat model used for answer generation.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4.1-mini";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Per-request timeout for provider HTTP calls, in seconds.
pub const PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Answer returned when resolution leaves no evidence to ground a reply on.
pub const NO_EVIDENCE_ANSWER: &str =
    "No relevant SOP content was found for this question, so no SOP-grounded answer can be given.";
