pub mod rank;
pub mod scoring;
pub mod types;

pub use rank::{top_journals, top_sdgs};
pub use scoring::{journal_mode, score_journals, score_sdgs, ScoringMode};
pub use types::{ScoredJournal, ScoredSdg};

use crate::config::{self, ScoringWeights};
use crate::query::Query;
use crate::sdg::SdgCatalog;
use crate::storage::VectorStore;
use std::collections::HashSet;

/// Ranked recommendations for one abstract.
#[derive(Debug, Clone)]
pub struct Analysis<'a> {
    pub journals: Vec<ScoredJournal<'a>>,
    pub sdgs: Vec<ScoredSdg>,
    pub mode: ScoringMode,
}

/// Score and rank journals and SDGs for `query`.
///
/// Synchronous and read-only: the store, catalog and exclusion snapshot are
/// all borrowed for the duration of the call.
pub fn analyze<'a>(
    store: &'a VectorStore,
    catalog: &SdgCatalog,
    query: &Query,
    excluded: &HashSet<String>,
    weights: ScoringWeights,
) -> Analysis<'a> {
    let scores = score_journals(store, query, excluded);
    let journals = top_journals(store, &scores, query.top_k());
    let sdgs = top_sdgs(score_sdgs(catalog, query, weights), config::SDG_TOP_N);
    Analysis {
        journals,
        sdgs,
        mode: journal_mode(store, query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::JournalMeta;
    use crate::tokenizer::tokenize;

    fn meta(id: &str) -> JournalMeta {
        JournalMeta {
            id: id.to_string(),
            name: format!("Journal {id}"),
            publisher: Some("Elsevier".into()),
            coverage: None,
            scope: None,
            link: None,
            asjc: None,
        }
    }

    fn abc_store() -> VectorStore {
        let mut store = VectorStore::new(2, 8);
        store.push(meta("a"), tokenize("marine chemistry"), Some(&[1.0, 0.0]));
        store.push(meta("b"), tokenize("urban economics"), Some(&[0.0, 1.0]));
        store.push(meta("c"), tokenize("coastal sediment"), Some(&[0.9, 0.1]));
        store
    }

    fn ids(analysis: &Analysis<'_>) -> Vec<String> {
        analysis
            .journals
            .iter()
            .map(|j| j.entry.meta.id.clone())
            .collect()
    }

    fn seventeen_goals() -> SdgCatalog {
        let records = (1..=17)
            .map(|id| format!(r#"{{"id":{id},"name":"Goal {id}","keywords":["goal{id}"]}}"#))
            .collect::<Vec<_>>()
            .join(",");
        SdgCatalog::from_json(&format!("[{records}]")).unwrap()
    }

    #[test]
    fn test_semantic_top_two() {
        let store = abc_store();
        let query = Query::new("Sea water chemistry", Some(2))
            .unwrap()
            .with_embedding(Some(vec![1.0, 0.0]));
        let analysis = analyze(&store, &SdgCatalog::default(), &query, &HashSet::new(), ScoringWeights::default());
        assert_eq!(analysis.mode, ScoringMode::Semantic);
        assert_eq!(ids(&analysis), vec!["a", "c"]);
        assert!((analysis.journals[0].score - 1.0).abs() < 1e-9);
        assert!((analysis.journals[1].score - 0.9939).abs() < 1e-3);
    }

    #[test]
    fn test_excluded_journal_never_returned() {
        let store = abc_store();
        let query = Query::new("Sea water chemistry", Some(3))
            .unwrap()
            .with_embedding(Some(vec![1.0, 0.0]));
        let excluded: HashSet<String> = ["a".to_string()].into_iter().collect();
        let analysis = analyze(&store, &SdgCatalog::default(), &query, &excluded, ScoringWeights::default());
        assert_eq!(ids(&analysis)[0], "c");
        assert!(!ids(&analysis).contains(&"a".to_string()));
        assert_eq!(analysis.journals.len(), 2);
    }

    #[test]
    fn test_lexical_without_overlap_keeps_ingestion_order() {
        let store = abc_store();
        let query = Query::new("Quantum gravity phenomenology", Some(3)).unwrap();
        let analysis = analyze(&store, &SdgCatalog::default(), &query, &HashSet::new(), ScoringWeights::default());
        assert_eq!(analysis.mode, ScoringMode::Lexical);
        assert_eq!(ids(&analysis), vec!["a", "b", "c"]);
        assert!(analysis.journals.iter().all(|j| j.score == 0.0));
    }

    #[test]
    fn test_result_length_bounded_by_k_and_corpus() {
        let store = abc_store();
        for k in [1, 2, 3, 5, 20] {
            let query = Query::new("marine sediment", Some(k)).unwrap();
            let analysis = analyze(&store, &SdgCatalog::default(), &query, &HashSet::new(), ScoringWeights::default());
            assert_eq!(analysis.journals.len(), k.min(3));
            assert!(analysis
                .journals
                .windows(2)
                .all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_always_three_sdgs() {
        let store = abc_store();
        let catalog = seventeen_goals();
        let query = Query::new("Nothing in common here", None).unwrap();
        let analysis = analyze(&store, &catalog, &query, &HashSet::new(), ScoringWeights::default());
        assert_eq!(analysis.sdgs.len(), config::SDG_TOP_N);

        let query = Query::new("About goal12 and goal5", None).unwrap();
        let analysis = analyze(&store, &catalog, &query, &HashSet::new(), ScoringWeights::default());
        let sdg_ids: Vec<u32> = analysis.sdgs.iter().map(|s| s.id).collect();
        assert_eq!(sdg_ids, vec![5, 12, 1]);
    }

    #[test]
    fn test_out_of_range_embeddings_score_lexically() {
        let mut store = VectorStore::new(2, 4);
        let source = concat!(
            r#"{"id":"f32inf","name":"A","embedding":[1e39,0.0],"content":"coral reef ecology"}"#,
            "\n",
            r#"{"id":"f64inf","name":"B","embedding":[1e400,0.0],"content":"coral reef ecology"}"#,
        );
        crate::storage::ingest_jsonl(std::io::Cursor::new(source), &mut store).unwrap();
        let query = Query::new("coral reef ecology", Some(5))
            .unwrap()
            .with_embedding(Some(vec![1.0, 0.0]));
        let analysis = analyze(&store, &SdgCatalog::default(), &query, &HashSet::new(), ScoringWeights::default());
        assert_eq!(analysis.mode, ScoringMode::Semantic);
        assert_eq!(ids(&analysis), vec!["f32inf", "f64inf"]);
        assert!(analysis.journals.iter().all(|j| (j.score - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_empty_store() {
        let store = VectorStore::new(2, 4);
        let query = Query::new("anything at all", None).unwrap();
        let analysis = analyze(&store, &SdgCatalog::default(), &query, &HashSet::new(), ScoringWeights::default());
        assert!(analysis.journals.is_empty());
        assert!(analysis.sdgs.is_empty());
    }
}
