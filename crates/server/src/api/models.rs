//! Request and response data transfer objects for the REST API.
//!
//! Field names follow the JSON contract of the web client (`topK`,
//! `matchedKeywords`), hence the per-field renames.

use crate::recommender::RecommendedJournal;
use scopematch_core::document::RecordId;
use scopematch_core::search::ScoredSdg;
use scopematch_core::storage::{CorpusSource, IngestStats};
use serde::{Deserialize, Serialize};

/// Request body for `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(rename = "topK", default)]
    pub top_k: Option<usize>,
}

/// One SDG in an analysis response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdgResult {
    pub id: u32,
    pub name: String,
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

impl From<ScoredSdg> for SdgResult {
    fn from(sdg: ScoredSdg) -> Self {
        Self {
            id: sdg.id,
            name: sdg.name,
            score: sdg.score,
            matched_keywords: sdg.matched_keywords,
        }
    }
}

/// Response body for `POST /analyze`.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub journals: Vec<RecommendedJournal>,
    pub sdgs: Vec<SdgResult>,
    /// `true` when journals were ranked by embedding similarity.
    pub semantic: bool,
}

/// Query parameters for `GET /admin/journals`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminJournalsQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Parsed leniently: anything that is not an integer ≥ 1 means page 1.
    #[serde(default)]
    pub page: Option<String>,
}

impl AdminJournalsQuery {
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1) as usize
    }
}

/// One row of the admin journal listing.
#[derive(Debug, Serialize)]
pub struct AdminJournalItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub excluded: bool,
}

/// Response body for `GET /admin/journals`.
#[derive(Debug, Serialize)]
pub struct AdminJournalsResponse {
    pub items: Vec<AdminJournalItem>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

/// Request body for `POST /admin/journal`.
#[derive(Debug, Deserialize)]
pub struct SetExclusionRequest {
    pub id: RecordId,
    pub excluded: bool,
}

/// Response body for `POST /admin/journal`.
#[derive(Debug, Serialize)]
pub struct SetExclusionResponse {
    pub success: bool,
    pub excluded: bool,
}

/// Response body for `POST /admin/reload`.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub entries: usize,
    pub source: CorpusSource,
    pub stats: IngestStats,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub corpus_loaded: bool,
    pub corpus_loading: bool,
    pub corpus_entries: usize,
    pub corpus_semantic_entries: usize,
    pub corpus_capacity: usize,
    pub dimension: usize,
    pub sdgs: usize,
    pub embedding_provider: String,
    pub embeddings_available: bool,
}
