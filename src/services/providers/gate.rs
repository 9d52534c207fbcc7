/// Concurrency gates in front of model providers
///
/// Model inference may not tolerate unbounded concurrent callers. Each gate owns a
/// semaphore; with one permit calls are strictly single-flight.
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{
    error::{AppError, AppResult},
    services::providers::{EmbeddingProvider, EmotionClassifier, EmotionScore},
};

async fn acquire(permits: &Semaphore) -> AppResult<tokio::sync::SemaphorePermit<'_>> {
    permits
        .acquire()
        .await
        .map_err(|e| AppError::Internal(format!("model gate closed: {}", e)))
}

pub struct GatedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    permits: Semaphore,
}

impl GatedEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_in_flight.max(1)),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GatedEmbedder {
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let _permit = acquire(&self.permits).await?;
        self.inner.embed(texts).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

pub struct GatedClassifier {
    inner: Arc<dyn EmotionClassifier>,
    permits: Semaphore,
}

impl GatedClassifier {
    pub fn new(inner: Arc<dyn EmotionClassifier>, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_in_flight.max(1)),
        }
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for GatedClassifier {
    async fn classify(&self, text: &str) -> AppResult<Vec<EmotionScore>> {
        let _permit = acquire(&self.permits).await?;
        self.inner.classify(text).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
