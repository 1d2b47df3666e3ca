//! REST API layer built on Axum.
//!
//! Provides the analysis endpoint, the SDG catalog listing and the admin
//! endpoints for journal exclusions and corpus reloads. Includes middleware for
//! request timeouts, body size limits, concurrency limits, metrics collection
//! and request ID tracing.

/// API error types mapped to HTTP status codes.
pub mod errors;
/// HTTP request handlers and application state.
pub mod handlers;
/// Prometheus metrics recording.
pub mod metrics;
/// Request and response data transfer objects.
pub mod models;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{middleware, Router};
use handlers::AppState;
use scopematch_core::config;
use std::time::{Duration, Instant};
use tower::buffer::BufferLayer;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id that is echoed back instead of replaced.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Headers attached to every response. Analysis results are per abstract, so
/// nothing is cacheable.
const RESPONSE_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("cache-control", "no-store"),
];

/// Route template of the request, e.g. `/admin/journals`, or `unmatched`.
fn route_label(req: &Request<Body>) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string())
}

/// Keeps a well-formed `x-request-id` from the caller, otherwise mints a UUID v4.
fn request_id(req: &Request<Body>) -> HeaderValue {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .filter(|v| {
            let bytes = v.as_bytes();
            !bytes.is_empty()
                && bytes.len() <= MAX_REQUEST_ID_LEN
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        })
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
                .expect("UUID v4 is always valid ASCII for header values")
        })
}

async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let request_id = request_id(&req);
    let span = tracing::info_span!(
        "request",
        request_id = request_id.to_str().unwrap_or_default(),
        method = %req.method(),
        route = %route_label(&req),
    );
    async move {
        let mut response = next.run(req).await;
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id);
        response
    }
    .instrument(span)
    .await
}

async fn response_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in RESPONSE_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let route = route_label(&req);
    let start = Instant::now();
    let response = next.run(req).await;
    metrics::record_request(method.as_str(), &route, response.status(), start.elapsed());
    response
}

/// Builds the Axum router with all routes and middleware layers.
///
/// The middleware stack (outermost to innermost):
/// Concurrency limit → Timeout → Body limit → CORS → Trace → Compression →
/// Response headers → Request ID → Metrics.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/analyze", post(handlers::analyze))
        .route("/sdgs", get(handlers::list_sdgs))
        .route("/admin/journals", get(handlers::admin_journals))
        .route("/admin/journal", post(handlers::set_exclusion))
        .route("/admin/reload", post(handlers::reload))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(response_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(config::MAX_REQUEST_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: tower::BoxError| async move {
                    if err.is::<tower::timeout::error::Elapsed>() {
                        StatusCode::REQUEST_TIMEOUT
                    } else {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                }))
                .layer(BufferLayer::new(1024))
                .layer(ConcurrencyLimitLayer::new(config::MAX_CONCURRENT_REQUESTS))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config::REQUEST_TIMEOUT_SECS,
                ))),
        )
        .with_state(state)
}
