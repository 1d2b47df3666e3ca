//! Per-query scoring of the journal corpus and the SDG catalog.

use crate::config::ScoringWeights;
use crate::document::Scorability;
use crate::query::Query;
use crate::sdg::SdgCatalog;
use crate::search::types::ScoredSdg;
use crate::similarity;
use crate::storage::VectorStore;
use std::collections::HashSet;

/// Which similarity a query is scored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Query embedding matches the store dimension; embedded entries use cosine.
    Semantic,
    /// No usable query embedding; every entry uses Jaccard.
    Lexical,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Semantic => "semantic",
            ScoringMode::Lexical => "lexical",
        }
    }
}

/// Decide the journal scoring mode for `query` against `store`.
pub fn journal_mode(store: &VectorStore, query: &Query) -> ScoringMode {
    match query.embedding() {
        Some(q) if q.len() == store.dimension() => ScoringMode::Semantic,
        _ => ScoringMode::Lexical,
    }
}

/// Score every non-excluded journal, returning `(index, score)` in ingestion order.
///
/// Linear scan over the flat vector buffer. The query norm is computed once
/// per query and entry norms were fixed at ingestion, so the loop does no
/// allocation beyond the output vector.
pub fn score_journals(
    store: &VectorStore,
    query: &Query,
    excluded: &HashSet<String>,
) -> Vec<(u32, f64)> {
    let q = match journal_mode(store, query) {
        ScoringMode::Semantic => query.embedding(),
        ScoringMode::Lexical => None,
    };
    let q_norm = query.embedding_norm();

    let mut scores = Vec::with_capacity(store.len().saturating_sub(excluded.len()));
    for (index, (entry, vector)) in store.iter().enumerate() {
        if excluded.contains(&entry.meta.id) {
            continue;
        }
        let score = match (q, entry.scorability) {
            (Some(q), Scorability::Semantic { norm }) => {
                similarity::cosine_prenorm(q, vector, q_norm, norm)
            }
            _ => similarity::jaccard(query.tokens(), &entry.tokens),
        };
        scores.push((index as u32, score));
    }
    scores
}

/// Score the whole SDG catalog, in catalog order.
pub fn score_sdgs(catalog: &SdgCatalog, query: &Query, weights: ScoringWeights) -> Vec<ScoredSdg> {
    catalog
        .entries()
        .iter()
        .map(|sdg| {
            let semantic = match (query.embedding(), sdg.embedding.as_deref()) {
                (Some(q), Some(e)) if q.len() == e.len() => {
                    similarity::cosine_prenorm(q, e, query.embedding_norm(), sdg.norm)
                }
                _ => 0.0,
            };
            let matched_keywords = sdg.matched_keywords(query.text(), query.lowered());
            let score =
                weights.semantic * semantic + weights.keyword * matched_keywords.len() as f64;
            ScoredSdg {
                id: sdg.id,
                name: sdg.name.clone(),
                score: if score.is_finite() { score } else { 0.0 },
                semantic,
                matched_keywords,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::JournalMeta;
    use crate::tokenizer::tokenize;

    fn meta(id: &str) -> JournalMeta {
        JournalMeta {
            id: id.to_string(),
            name: id.to_uppercase(),
            publisher: None,
            coverage: None,
            scope: None,
            link: None,
            asjc: None,
        }
    }

    fn abc_store() -> VectorStore {
        let mut store = VectorStore::new(2, 8);
        store.push(meta("a"), tokenize("ocean acidification"), Some(&[1.0, 0.0]));
        store.push(meta("b"), tokenize("urban planning"), Some(&[0.0, 1.0]));
        store.push(meta("c"), tokenize("coastal ocean"), Some(&[0.9, 0.1]));
        store
    }

    #[test]
    fn test_semantic_scores() {
        let store = abc_store();
        let query = Query::new("anything", None).unwrap().with_embedding(Some(vec![1.0, 0.0]));
        assert_eq!(journal_mode(&store, &query), ScoringMode::Semantic);
        let scores = score_journals(&store, &query, &HashSet::new());
        assert_eq!(scores.len(), 3);
        assert!((scores[0].1 - 1.0).abs() < 1e-9);
        assert!(scores[1].1.abs() < 1e-9);
        assert!((scores[2].1 - 0.9939).abs() < 1e-3);
    }

    #[test]
    fn test_excluded_entries_are_skipped() {
        let store = abc_store();
        let query = Query::new("anything", None).unwrap().with_embedding(Some(vec![1.0, 0.0]));
        let excluded: HashSet<String> = ["a".to_string()].into_iter().collect();
        let scores = score_journals(&store, &query, &excluded);
        let indices: Vec<u32> = scores.iter().map(|&(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_wrong_query_dimension_falls_back_to_jaccard() {
        let store = abc_store();
        let query = Query::new("Deep ocean currents", None)
            .unwrap()
            .with_embedding(Some(vec![1.0, 0.0, 0.0]));
        assert_eq!(journal_mode(&store, &query), ScoringMode::Lexical);
        let scores = score_journals(&store, &query, &HashSet::new());
        // {deep, ocean, currents} vs {ocean, acidification}: 1 / 4
        assert!((scores[0].1 - 0.25).abs() < 1e-9);
        assert_eq!(scores[1].1, 0.0);
    }

    #[test]
    fn test_lexical_only_entry_in_semantic_query() {
        let mut store = VectorStore::new(2, 4);
        store.push(meta("x"), tokenize("coral reef ecology"), None);
        let query = Query::new("coral reef", None).unwrap().with_embedding(Some(vec![1.0, 0.0]));
        let scores = score_journals(&store, &query, &HashSet::new());
        // {coral, reef} vs {coral, reef, ecology}
        assert!((scores[0].1 - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_query_vector_scores_zero() {
        let store = abc_store();
        let query = Query::new("anything", None).unwrap().with_embedding(Some(vec![0.0, 0.0]));
        let scores = score_journals(&store, &query, &HashSet::new());
        assert!(scores.iter().all(|&(_, s)| s == 0.0));
    }

    #[test]
    fn test_sdg_scores_combine_semantic_and_keywords() {
        let catalog = SdgCatalog::from_json(
            r#"[{"id":6,"name":"Clean Water","keywords":["water","sanitation"],"embedding":[1.0,0.0]},
                {"id":13,"name":"Climate Action","keywords":["climate"],"embedding":[0.0,1.0]},
                {"id":14,"name":"Life Below Water","keywords":["ocean"]}]"#,
        )
        .unwrap();
        let query = Query::new("Water and sanitation in ocean towns", None)
            .unwrap()
            .with_embedding(Some(vec![1.0, 0.0]));
        let scored = score_sdgs(&catalog, &query, ScoringWeights::default());

        assert_eq!(scored[0].matched_keywords, vec!["water", "sanitation"]);
        assert!((scored[0].score - (0.5 + 0.2)).abs() < 1e-9);
        assert_eq!(scored[1].score, 0.0);
        assert_eq!(scored[2].semantic, 0.0);
        assert!((scored[2].score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_sdg_custom_weights() {
        let catalog =
            SdgCatalog::from_json(r#"[{"id":1,"name":"No Poverty","keywords":["poverty"],"embedding":[1.0]}]"#)
                .unwrap();
        let query = Query::new("Poverty traps", None).unwrap().with_embedding(Some(vec![2.0]));
        let weights = ScoringWeights {
            semantic: 1.0,
            keyword: 0.0,
        };
        let scored = score_sdgs(&catalog, &query, weights);
        assert!((scored[0].score - 1.0).abs() < 1e-9);
        assert_eq!(scored[0].matched_keywords, vec!["poverty"]);
    }
}
