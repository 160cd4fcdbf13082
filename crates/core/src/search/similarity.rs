//! Exact cosine similarity search.
//!
//! Every stored vector is scored against the normalized query with a dot
//! product. A bounded min-heap keeps the best `k` rows; equal scores keep
//! corpus order, so the earlier row wins a tie.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::document::DocumentRecord;
use crate::error::{Result, SopError};
use crate::index::distance::{dot_product, normalized};
use crate::index::VectorIndex;

/// A scored row. Greater means more relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked {
    score: OrderedFloat<f32>,
    row: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.row.cmp(&self.row))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the `k` records most similar to `query`, best first.
///
/// `k` is clamped to the corpus size. Each returned record is a copy of the
/// indexed record with `score` set to its cosine similarity, so callers can
/// modify results freely without touching the index.
///
/// Fails with [`SopError::EmptyIndex`] on an empty index and
/// [`SopError::DimensionMismatch`] if the query width is wrong.
pub fn similarity_search(
    index: &VectorIndex,
    query: &[f32],
    k: usize,
) -> Result<Vec<DocumentRecord>> {
    if index.is_empty() {
        return Err(SopError::EmptyIndex);
    }
    if query.len() != index.dimension() {
        return Err(SopError::DimensionMismatch {
            expected: index.dimension(),
            actual: query.len(),
        });
    }
    if query.iter().any(|x| !x.is_finite()) {
        return Err(SopError::InvalidQuery(
            "query vector contains non-finite values".into(),
        ));
    }

    let k = k.min(index.len());
    if k == 0 {
        return Ok(Vec::new());
    }

    let query = normalized(query);
    // Min-heap on relevance: the root is the weakest of the current top k.
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k + 1);
    for (row, vector) in index.vectors().enumerate() {
        let candidate = Ranked {
            score: OrderedFloat(dot_product(&query, vector)),
            row,
        };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if heap.peek().is_some_and(|Reverse(worst)| candidate > *worst) {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }

    let records = index.records();
    let results: Vec<DocumentRecord> = heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| records[ranked.row].clone().with_score(ranked.score.into_inner()))
        .collect();

    tracing::debug!(
        "Similarity search scanned {} vectors, returning {} (top score {:?})",
        index.len(),
        results.len(),
        results.first().and_then(|r| r.score)
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit vector in 2D whose cosine with `[1, 0]` is `s`.
    fn at_similarity(s: f32) -> Vec<f32> {
        vec![s, (1.0 - s * s).sqrt()]
    }

    fn index_with_scores(scores: &[f32]) -> VectorIndex {
        let vectors = scores.iter().map(|s| at_similarity(*s)).collect();
        let records = (0..scores.len())
            .map(|i| DocumentRecord::new(format!("SOP-{i}"), format!("doc {i}")))
            .collect();
        VectorIndex::from_parts(vectors, records).unwrap()
    }

    fn scores_of(results: &[DocumentRecord]) -> Vec<f32> {
        results.iter().map(|r| r.score.unwrap()).collect()
    }

    #[test]
    fn test_top_k_ordering() {
        let index = index_with_scores(&[0.9, 0.1, 0.5]);
        let results = similarity_search(&index, &[1.0, 0.0], 2).unwrap();
        let scores = scores_of(&results);
        assert_eq!(results.len(), 2);
        assert!((scores[0] - 0.9).abs() < 1e-4, "got {scores:?}");
        assert!((scores[1] - 0.5).abs() < 1e-4, "got {scores:?}");
        assert_eq!(results[0].id.as_deref(), Some("SOP-0"));
        assert_eq!(results[1].id.as_deref(), Some("SOP-2"));
    }

    #[test]
    fn test_k_clamped_to_corpus() {
        let index = index_with_scores(&[0.9, 0.1, 0.5]);
        let results = similarity_search(&index, &[1.0, 0.0], 100).unwrap();
        assert_eq!(results.len(), 3);
        let scores = scores_of(&results);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "got {scores:?}");
    }

    #[test]
    fn test_query_is_normalized() {
        let index = index_with_scores(&[0.9, 0.1, 0.5]);
        let results = similarity_search(&index, &[25.0, 0.0], 1).unwrap();
        assert!((results[0].score.unwrap() - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let index = index_with_scores(&[0.3, 0.7, 0.7, 0.7]);
        let results = similarity_search(&index, &[1.0, 0.0], 2).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["SOP-1", "SOP-2"]);
    }

    #[test]
    fn test_k_zero_returns_nothing() {
        let index = index_with_scores(&[0.9]);
        assert!(similarity_search(&index, &[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_index_rejected() {
        let index = VectorIndex::from_parts(Vec::new(), Vec::new()).unwrap();
        let err = similarity_search(&index, &[1.0], 3).unwrap_err();
        assert!(matches!(err, SopError::EmptyIndex), "got {err:?}");
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let index = index_with_scores(&[0.9]);
        let err = similarity_search(&index, &[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(
            matches!(err, SopError::DimensionMismatch { expected: 2, actual: 3 }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_non_finite_query_rejected() {
        let index = index_with_scores(&[0.9, 0.5]);
        for query in [[f32::NAN, 0.0], [1.0, f32::INFINITY]] {
            let err = similarity_search(&index, &query, 1).unwrap_err();
            assert!(matches!(err, SopError::InvalidQuery(_)), "got {err:?}");
        }
    }

    #[test]
    fn test_results_are_copies() {
        let index = index_with_scores(&[0.9, 0.5]);
        let mut results = similarity_search(&index, &[1.0, 0.0], 2).unwrap();
        results[0].title = "changed".into();
        assert_eq!(index.records()[0].title, "");
        assert_eq!(index.records()[0].score, None);
    }

    #[test]
    fn test_negative_similarity_ranks_last() {
        let index = VectorIndex::from_parts(
            vec![vec![-1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
            (0..3).map(|i| DocumentRecord::new(format!("{i}"), "")).collect(),
        )
        .unwrap();
        let results = similarity_search(&index, &[1.0, 0.0], 3).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["2", "1", "0"]);
        assert!((results[2].score.unwrap() + 1.0).abs() < 1e-5);
    }
}
