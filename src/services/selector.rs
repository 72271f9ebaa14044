use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::MovieMeta;

/// A selected catalog row with its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRow<'a> {
    /// Row index in the item matrix
    pub row: usize,
    pub score: f64,
    pub meta: &'a MovieMeta,
}

/// Picks the `k` best-scoring catalog rows, highest first, one per movie id
///
/// Only rows with a positive score are candidates. The best `min(k, n)` are
/// found by partial selection and only those are sorted. Rows whose id was
/// already emitted are dropped afterwards without backfilling, so the result
/// may be shorter than `k`.
///
/// Ties are broken by row index so that results are reproducible; callers
/// should not rely on any particular tie order.
pub fn select<'a>(scores: &[f64], metadata: &'a [MovieMeta], k: usize) -> Vec<ScoredRow<'a>> {
    debug_assert!(scores.is_empty() || scores.len() == metadata.len());

    let effective_k = k.min(scores.len());
    if effective_k == 0 {
        return Vec::new();
    }

    let descending = |a: &usize, b: &usize| -> Ordering {
        scores[*b].total_cmp(&scores[*a]).then_with(|| a.cmp(b))
    };

    let mut candidates: Vec<usize> = (0..scores.len().min(metadata.len()))
        .filter(|&row| scores[row] > 0.0)
        .collect();

    if effective_k < candidates.len() {
        candidates.select_nth_unstable_by(effective_k - 1, descending);
        candidates.truncate(effective_k);
    }
    candidates.sort_unstable_by(descending);

    let mut seen_ids = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|&row| seen_ids.insert(metadata[row].id))
        .map(|row| ScoredRow {
            row,
            score: scores[row],
            meta: &metadata[row],
        })
        .collect()
}
