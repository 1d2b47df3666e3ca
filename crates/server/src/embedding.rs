//! Query embedding providers.
//!
//! The recommender treats every provider as optional: any error (disabled,
//! network, timeout, bad payload) means the query is scored lexically.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider disabled")]
    Disabled,
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("embedding provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Turns abstract text into a dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short identifier used in logs and `/health`.
    fn name(&self) -> &str;

    /// `false` when the provider will never produce an embedding.
    fn is_available(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Provider used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmbeddings;

#[async_trait]
impl EmbeddingProvider for DisabledEmbeddings {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Disabled)
    }
}

/// OpenAI-compatible `POST {base_url}/embeddings` client.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": text.replace('\n', " "),
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status { status, body });
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".into()))?;
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::InvalidResponse(
                "embedding contains NaN or Inf".into(),
            ));
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Arc;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let provider = DisabledEmbeddings;
        assert!(!provider.is_available());
        assert!(matches!(provider.embed("x").await, Err(EmbeddingError::Disabled)));
    }

    #[tokio::test]
    async fn test_openai_request_shape() {
        let seen = Arc::new(parking_lot::Mutex::new(None::<(String, serde_json::Value)>));
        let seen_in = seen.clone();
        let router = Router::new().route(
            "/v1/embeddings",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let seen = seen_in.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *seen.lock() = Some((auth, body));
                    Json(json!({"data": [{"embedding": [0.25, -0.5]}]}))
                }
            }),
        );
        let base_url = spawn_stub(router).await;

        let provider =
            OpenAiEmbeddings::new(&base_url, "test-model", "sk-test", Duration::from_secs(5)).unwrap();
        let embedding = provider.embed("line one\nline two").await.unwrap();
        assert_eq!(embedding, vec![0.25, -0.5]);

        let (auth, body) = seen.lock().clone().unwrap();
        assert_eq!(auth, "Bearer sk-test");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["input"], "line one line two");
    }

    #[tokio::test]
    async fn test_openai_error_status() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base_url = spawn_stub(router).await;
        let provider =
            OpenAiEmbeddings::new(&base_url, "m", "k", Duration::from_secs(5)).unwrap();
        match provider.embed("text").await {
            Err(EmbeddingError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_openai_empty_data() {
        let router = Router::new().route(
            "/v1/embeddings",
            post(|| async { Json(json!({"data": []})) }),
        );
        let base_url = spawn_stub(router).await;
        let provider =
            OpenAiEmbeddings::new(&base_url, "m", "k", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            provider.embed("text").await,
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_openai_unreachable() {
        // Nothing listens on port 9 of localhost in the test environment.
        let provider =
            OpenAiEmbeddings::new("http://127.0.0.1:9/v1", "m", "k", Duration::from_secs(2)).unwrap();
        assert!(matches!(provider.embed("text").await, Err(EmbeddingError::Http(_))));
    }
}
