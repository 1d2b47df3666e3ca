//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::models::*;
use crate::recommender::Recommender;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use scopematch_core::config;
use scopematch_core::sdg::SdgSummary;
use scopematch_core::search::ScoringMode;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let rec = &state.recommender;
    let corpus = rec.corpus().current();
    let embeddings = rec.embeddings();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        corpus_loaded: corpus.is_some(),
        corpus_loading: rec.corpus().is_loading(),
        corpus_entries: corpus.as_ref().map_or(0, |c| c.store.len()),
        corpus_semantic_entries: corpus.as_ref().map_or(0, |c| c.store.semantic_count()),
        corpus_capacity: rec.corpus().capacity(),
        dimension: rec.corpus().dimension(),
        sdgs: rec.catalog().len(),
        embedding_provider: embeddings.name().to_string(),
        embeddings_available: embeddings.is_available(),
    })
}

/// `POST /analyze`
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = body?;
    let text = req
        .abstract_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Abstract required".into()))?;

    let result = state.recommender.recommend(&text, req.top_k).await?;

    Ok(Json(AnalyzeResponse {
        journals: result.journals,
        sdgs: result.sdgs.into_iter().map(SdgResult::from).collect(),
        semantic: result.mode == ScoringMode::Semantic,
    }))
}

/// `GET /sdgs`
pub async fn list_sdgs(State(state): State<AppState>) -> Result<Json<Vec<SdgSummary>>, ApiError> {
    let catalog = state.recommender.catalog();
    if catalog.is_empty() {
        return Err(ApiError::NotFound("SDG data not found".into()));
    }
    Ok(Json(catalog.entries().iter().map(SdgSummary::from).collect()))
}

/// `GET /admin/journals?q=&page=`
pub async fn admin_journals(
    State(state): State<AppState>,
    params: Result<Query<AdminJournalsQuery>, QueryRejection>,
) -> Result<Json<AdminJournalsResponse>, ApiError> {
    let Query(params) = params?;
    let rec = &state.recommender;

    let corpus = rec
        .corpus()
        .ensure_loaded()
        .await
        .map_err(|e| ApiError::Internal(format!("Corpus unavailable: {}", e)))?;
    let exclusions = rec.exclusions().clone();
    let excluded = tokio::task::spawn_blocking(move || exclusions.load())
        .await
        .map_err(|e| ApiError::Internal(format!("Exclusion read failed: {}", e)))?;

    let needle = params.q.as_deref().unwrap_or("").trim();
    let page = params.page();
    let matches: Vec<_> = corpus.store.find(needle).collect();
    let total = matches.len();
    let pages = total.div_ceil(config::ADMIN_PAGE_SIZE);

    let items = matches
        .into_iter()
        .skip((page - 1).saturating_mul(config::ADMIN_PAGE_SIZE))
        .take(config::ADMIN_PAGE_SIZE)
        .map(|e| AdminJournalItem {
            id: e.meta.id.clone(),
            name: e.meta.name.clone(),
            publisher: e.meta.publisher.clone(),
            excluded: excluded.contains(&e.meta.id),
        })
        .collect();

    Ok(Json(AdminJournalsResponse {
        items,
        total,
        page,
        pages,
    }))
}

/// `POST /admin/journal`
pub async fn set_exclusion(
    State(state): State<AppState>,
    body: Result<Json<SetExclusionRequest>, JsonRejection>,
) -> Result<Json<SetExclusionResponse>, ApiError> {
    let Json(req) = body?;
    let id = req
        .id
        .into_string()
        .ok_or_else(|| ApiError::BadRequest("Journal id must not be empty".into()))?;

    let exclusions = state.recommender.exclusions().clone();
    let excluded = req.excluded;
    let result = tokio::task::spawn_blocking(move || exclusions.set_excluded(&id, excluded))
        .await
        .map_err(|e| ApiError::Internal(format!("Exclusion update failed: {}", e)))?;
    let excluded = result.map_err(|e| {
        tracing::error!("Exclusion update failed: {}", e);
        ApiError::Internal(format!("Exclusion update failed: {}", e))
    })?;

    Ok(Json(SetExclusionResponse {
        success: true,
        excluded,
    }))
}

/// `POST /admin/reload`
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let corpus = state
        .recommender
        .corpus()
        .reload()
        .await
        .map_err(|e| ApiError::Internal(format!("Corpus reload failed: {}", e)))?;
    tracing::info!(entries = corpus.store.len(), "Corpus reloaded");
    Ok(Json(ReloadResponse {
        entries: corpus.store.len(),
        source: corpus.source,
        stats: corpus.stats,
    }))
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
