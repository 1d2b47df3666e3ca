//! Per-query orchestration: embed, load, filter, score, rank.

use crate::api::metrics;
use crate::corpus::CorpusService;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use scopematch_core::config::ScoringWeights;
use scopematch_core::document::JournalMeta;
use scopematch_core::error::CoreError;
use scopematch_core::exclusions::ExclusionList;
use scopematch_core::query::Query;
use scopematch_core::sdg::SdgCatalog;
use scopematch_core::search::{self, ScoredSdg, ScoringMode};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error(transparent)]
    InvalidQuery(CoreError),
    #[error("corpus unavailable: {0}")]
    CorpusUnavailable(Arc<CoreError>),
}

/// One journal recommendation with its display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedJournal {
    #[serde(flatten)]
    pub meta: JournalMeta,
    pub score: f64,
}

/// Ranked journals and SDGs for one abstract.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub journals: Vec<RecommendedJournal>,
    pub sdgs: Vec<ScoredSdg>,
    pub mode: ScoringMode,
}

pub struct Recommender {
    corpus: Arc<CorpusService>,
    exclusions: Arc<ExclusionList>,
    catalog: Arc<SdgCatalog>,
    embeddings: Arc<dyn EmbeddingProvider>,
    weights: ScoringWeights,
    embed_timeout: Duration,
}

impl Recommender {
    pub fn new(
        corpus: Arc<CorpusService>,
        exclusions: Arc<ExclusionList>,
        catalog: Arc<SdgCatalog>,
        embeddings: Arc<dyn EmbeddingProvider>,
        weights: ScoringWeights,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            corpus,
            exclusions,
            catalog,
            embeddings,
            weights,
            embed_timeout,
        }
    }

    pub fn corpus(&self) -> &Arc<CorpusService> {
        &self.corpus
    }

    pub fn exclusions(&self) -> &Arc<ExclusionList> {
        &self.exclusions
    }

    pub fn catalog(&self) -> &SdgCatalog {
        &self.catalog
    }

    pub fn embeddings(&self) -> &dyn EmbeddingProvider {
        self.embeddings.as_ref()
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Recommend journals and SDGs for `text`.
    ///
    /// The embedding request, the corpus load and the exclusion read run
    /// concurrently. A missing embedding downgrades the query to lexical
    /// scoring; only invalid input or a failed corpus load is an error.
    pub async fn recommend(
        &self,
        text: &str,
        top_k: Option<usize>,
    ) -> Result<Recommendation, RecommendError> {
        let start = Instant::now();
        let query = Query::new(text, top_k).map_err(RecommendError::InvalidQuery)?;

        let exclusions = self.exclusions.clone();
        let (embedding, corpus, excluded) = tokio::join!(
            self.embed(query.text()),
            self.corpus.ensure_loaded(),
            tokio::task::spawn_blocking(move || exclusions.load()),
        );
        let corpus = corpus.map_err(RecommendError::CorpusUnavailable)?;
        let excluded = excluded.unwrap_or_else(|e| {
            tracing::warn!("Exclusion read task failed: {}", e);
            HashSet::new()
        });
        let query = query.with_embedding(embedding);

        let analysis = search::analyze(
            &corpus.store,
            &self.catalog,
            &query,
            &excluded,
            self.weights,
        );
        let journals = analysis
            .journals
            .iter()
            .map(|j| RecommendedJournal {
                meta: j.entry.meta.clone(),
                score: j.score,
            })
            .collect::<Vec<_>>();

        metrics::record_analysis(analysis.mode.as_str(), start.elapsed());
        tracing::info!(
            mode = analysis.mode.as_str(),
            k = query.top_k(),
            results = journals.len(),
            excluded = excluded.len(),
            "Analysis completed"
        );

        Ok(Recommendation {
            journals,
            sdgs: analysis.sdgs,
            mode: analysis.mode,
        })
    }

    /// Fail-closed embedding: every error becomes `None`.
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if !self.embeddings.is_available() {
            return None;
        }
        match tokio::time::timeout(self.embed_timeout, self.embeddings.embed(text)).await {
            Ok(Ok(embedding)) => Some(embedding),
            Ok(Err(e)) => {
                let reason = match &e {
                    EmbeddingError::Disabled => "disabled",
                    EmbeddingError::Http(_) => "http",
                    EmbeddingError::Status { .. } => "status",
                    EmbeddingError::InvalidResponse(_) => "invalid_response",
                };
                tracing::warn!(provider = self.embeddings.name(), "Embedding failed, using lexical scoring: {}", e);
                metrics::record_embedding_failure(reason);
                None
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.embeddings.name(),
                    timeout_ms = self.embed_timeout.as_millis() as u64,
                    "Embedding timed out, using lexical scoring"
                );
                metrics::record_embedding_failure("timeout");
                None
            }
        }
    }
}
