//! Per-family selection of the most current SOP revision.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::document::DocumentRecord;
use crate::resolve::criteria::{
    EffectiveDate, RecencyCriterion, SimilarityScore, Verdict, VersionNumber,
};

/// Collapses scored candidates to one record per document id.
///
/// The first record seen for an id starts as the family's best; each later
/// candidate replaces it only if the cascade returns [`Verdict::Newer`].
/// Records without an id are dropped. Survivors are returned sorted by
/// descending score; ties keep first-seen order. Input is never mutated.
#[derive(Debug)]
pub struct VersionResolver {
    criteria: Vec<Box<dyn RecencyCriterion>>,
}

impl Default for VersionResolver {
    /// Effective date, then version number, then similarity score.
    fn default() -> Self {
        Self::new(vec![
            Box::new(EffectiveDate::default()),
            Box::new(VersionNumber),
            Box::new(SimilarityScore),
        ])
    }
}

impl VersionResolver {
    /// Creates a resolver applying `criteria` in order.
    pub fn new(criteria: Vec<Box<dyn RecencyCriterion>>) -> Self {
        Self { criteria }
    }

    /// Names of the cascade levels, in order.
    pub fn criteria_names(&self) -> Vec<&'static str> {
        self.criteria.iter().map(|c| c.name()).collect()
    }

    /// Runs the cascade and returns the first decisive verdict.
    pub fn compare(&self, candidate: &DocumentRecord, incumbent: &DocumentRecord) -> Verdict {
        for criterion in &self.criteria {
            let verdict = criterion.compare(candidate, incumbent);
            if verdict.is_decisive() {
                tracing::trace!(
                    "{:?} vs {:?}: {:?} by {}",
                    candidate.version,
                    incumbent.version,
                    verdict,
                    criterion.name()
                );
                return verdict;
            }
        }
        Verdict::Undecided
    }

    /// Returns `true` if `candidate` should replace `incumbent`.
    pub fn is_newer(&self, candidate: &DocumentRecord, incumbent: &DocumentRecord) -> bool {
        self.compare(candidate, incumbent) == Verdict::Newer
    }

    /// Keeps the most current record of every version-family, best score first.
    pub fn resolve(&self, candidates: &[DocumentRecord]) -> Vec<DocumentRecord> {
        let mut slot_by_id: HashMap<&str, usize> = HashMap::new();
        let mut best: Vec<&DocumentRecord> = Vec::new();
        let mut dropped = 0usize;

        for candidate in candidates {
            let Some(id) = candidate.family_id() else {
                dropped += 1;
                continue;
            };
            match slot_by_id.get(id) {
                Some(&slot) => {
                    if self.is_newer(candidate, best[slot]) {
                        best[slot] = candidate;
                    }
                }
                None => {
                    slot_by_id.insert(id, best.len());
                    best.push(candidate);
                }
            }
        }

        if dropped > 0 {
            tracing::warn!("Dropped {} candidates without a document id", dropped);
        }

        let mut resolved: Vec<DocumentRecord> = best.into_iter().cloned().collect();
        resolved.sort_by(by_score_desc);

        tracing::debug!(
            "Resolved {} candidates into {} document families",
            candidates.len(),
            resolved.len()
        );
        resolved
    }
}

/// Descending score; absent scores sort last.
fn by_score_desc(a: &DocumentRecord, b: &DocumentRecord) -> Ordering {
    match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
