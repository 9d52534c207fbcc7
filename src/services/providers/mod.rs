/// Model provider abstraction
///
/// The engine talks to two external models: an embedder (text → vector) and an
/// emotion classifier (text → ranked labels). Both are injected as trait objects
/// so the scoring code never knows how or where a model was loaded. Local,
/// dependency-free implementations are used when no remote endpoint is configured.
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppResult};

pub mod gate;
pub mod hashing;
pub mod lexicon;
pub mod remote;

pub use gate::{GatedClassifier, GatedEmbedder};
pub use hashing::HashingEmbedder;
pub use lexicon::LexiconClassifier;
pub use remote::{RemoteClassifier, RemoteEmbedder};

/// Trait for text embedding models
///
/// Implementations must preserve input order and return exactly one vector per
/// input text, all of the same dimension.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts in one call
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// One label produced by an emotion classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    #[serde(alias = "confidence")]
    pub score: f32,
}

/// Trait for emotion classification models
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify text into every known label, ranked by descending confidence
    async fn classify(&self, text: &str) -> AppResult<Vec<EmotionScore>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Model handles shared by every request
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub classifier: Arc<dyn EmotionClassifier>,
}

impl Providers {
    /// Builds providers from configuration, each behind a concurrency gate
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.model_timeout_secs);

        let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding_url {
            Some(url) => Arc::new(RemoteEmbedder::new(url.clone(), timeout)?),
            None => Arc::new(HashingEmbedder::new(config.embedding_dimensions)),
        };

        let classifier: Arc<dyn EmotionClassifier> = match &config.classifier_url {
            Some(url) => Arc::new(RemoteClassifier::new(url.clone(), timeout)?),
            None => Arc::new(LexiconClassifier::new()),
        };

        tracing::info!(
            embedder = embedder.name(),
            classifier = classifier.name(),
            model_concurrency = config.model_concurrency,
            "Model providers configured"
        );

        Ok(Self {
            embedder: Arc::new(GatedEmbedder::new(embedder, config.model_concurrency)),
            classifier: Arc::new(GatedClassifier::new(classifier, config.model_concurrency)),
        })
    }

    /// Local providers with single-flight gating
    pub fn local() -> Self {
        Self {
            embedder: Arc::new(GatedEmbedder::new(
                Arc::new(HashingEmbedder::default()),
                1,
            )),
            classifier: Arc::new(GatedClassifier::new(Arc::new(LexiconClassifier::new()), 1)),
        }
    }
}
