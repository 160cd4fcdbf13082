//! Version resolution for scored SOP candidates.
//!
//! A similarity search may return several revisions of the same SOP. The
//! resolver keeps exactly one record per document id, chosen by an ordered
//! cascade of recency criteria (effective date, then version number, then
//! similarity score), and re-sorts the survivors by score.

/// Individual recency criteria and the label parsers they rely on.
pub mod criteria;
/// The `VersionResolver` that applies the cascade per version-family.
pub mod resolver;

pub use criteria::{
    parse_effective_date, parse_version, EffectiveDate, RecencyCriterion, SimilarityScore,
    Verdict, VersionNumber,
};
pub use resolver::VersionResolver;
