//! scopematch-server: HTTP service for scopematch.
//!
//! Provides the REST API, the query embedding client and the lazily loaded
//! corpus. Scoring and ranking live in `scopematch-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Single-flight corpus loading and reload.
pub mod corpus;
/// Query embedding providers.
pub mod embedding;
/// Per-query orchestration of embedding, loading and scoring.
pub mod recommender;
