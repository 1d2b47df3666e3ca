//! Top-K selection over scored journals and SDGs.

use crate::search::types::{ScoredJournal, ScoredSdg};
use crate::storage::VectorStore;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Best `k` journals by score, descending. Equal scores keep ingestion order.
///
/// Partial sort: O(n log k) via a min-heap of size k whose weakest element is
/// the lowest score with the highest index.
pub fn top_journals<'a>(
    store: &'a VectorStore,
    scores: &[(u32, f64)],
    k: usize,
) -> Vec<ScoredJournal<'a>> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, Reverse<u32>)>> =
        BinaryHeap::with_capacity(k + 1);
    for &(index, score) in scores {
        heap.push(Reverse((OrderedFloat(score), Reverse(index))));
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut best: Vec<(OrderedFloat<f64>, u32)> = heap
        .into_iter()
        .map(|Reverse((score, Reverse(index)))| (score, index))
        .collect();
    best.sort_unstable_by_key(|&(score, index)| (Reverse(score), index));

    best.into_iter()
        .filter_map(|(score, index)| {
            store.entry(index as usize).map(|entry| ScoredJournal {
                entry,
                score: score.0,
            })
        })
        .collect()
}

/// Best `n` SDGs by score, descending. Stable, so ties keep catalog order.
pub fn top_sdgs(mut scored: Vec<ScoredSdg>, n: usize) -> Vec<ScoredSdg> {
    scored.sort_by_key(|s| Reverse(OrderedFloat(s.score)));
    scored.truncate(n);
    scored
}
