//! Scored result types produced by one analysis.

use crate::document::JournalEntry;
use serde::Serialize;

/// A journal with its relevance score, borrowing the store entry.
///
/// The score is cosine similarity when both the query and the entry carry an
/// embedding, otherwise Jaccard token overlap.
#[derive(Debug, Clone, Copy)]
pub struct ScoredJournal<'a> {
    pub entry: &'a JournalEntry,
    pub score: f64,
}

/// An SDG with its weighted score and the keywords that contributed to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSdg {
    pub id: u32,
    pub name: String,
    /// `semantic_weight * semantic + keyword_weight * matched_keywords.len()`.
    pub score: f64,
    /// Raw cosine against the SDG embedding, 0.0 when unavailable.
    pub semantic: f64,
    pub matched_keywords: Vec<String>,
}
