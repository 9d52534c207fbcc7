/// HTTP-backed model providers
///
/// Request/response shapes follow text-embeddings-inference:
/// - Embeddings: `POST {"inputs": [text, ...]}` → `[[f32, ...], ...]`
/// - Classification: `POST {"inputs": text}` → `[{"label": ..., "score": ...}, ...]`
///
/// Any transport failure, timeout, non-success status or malformed payload is
/// reported as [`AppError::ModelUnavailable`]; nothing is retried here.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    services::providers::{EmbeddingProvider, EmotionClassifier, EmotionScore},
};

#[derive(Serialize)]
struct BatchInput<'a> {
    inputs: &'a [String],
}

#[derive(Serialize)]
struct SingleInput<'a> {
    inputs: &'a str,
}

fn build_client(timeout: Duration) -> anyhow::Result<HttpClient> {
    Ok(HttpClient::builder().timeout(timeout).build()?)
}

fn unavailable(provider: &str, error: impl std::fmt::Display) -> AppError {
    tracing::warn!(provider, error = %error, "Model call failed");
    AppError::ModelUnavailable(format!("{}: {}", provider, error))
}

#[derive(Clone)]
pub struct RemoteEmbedder {
    http_client: HttpClient,
    url: String,
}

impl RemoteEmbedder {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            url,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    #[instrument(skip(self, texts), fields(batch = texts.len()))]
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http_client
            .post(&self.url)
            .json(&BatchInput { inputs: texts })
            .send()
            .await
            .map_err(|e| unavailable(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(
                self.name(),
                format!("status {}: {}", status, body),
            ));
        }

        let vectors: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| unavailable(self.name(), e))?;

        if vectors.len() != texts.len() {
            return Err(unavailable(
                self.name(),
                format!("expected {} vectors, got {}", texts.len(), vectors.len()),
            ));
        }

        Ok(vectors)
    }

    fn name(&self) -> &'static str {
        "remote-embedder"
    }
}

#[derive(Clone)]
pub struct RemoteClassifier {
    http_client: HttpClient,
    url: String,
}

impl RemoteClassifier {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            url,
        })
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for RemoteClassifier {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn classify(&self, text: &str) -> AppResult<Vec<EmotionScore>> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&SingleInput { inputs: text })
            .send()
            .await
            .map_err(|e| unavailable(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(
                self.name(),
                format!("status {}: {}", status, body),
            ));
        }

        let mut scores: Vec<EmotionScore> = response
            .json()
            .await
            .map_err(|e| unavailable(self.name(), e))?;

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "remote-classifier"
    }
}
