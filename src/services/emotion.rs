//! Emotion routing for mood-text queries.
//!
//! A query is resolved to a target genre set by an ordered list of resolvers.
//! The first resolver that returns a match wins:
//! 1. explicit genre names in the text
//! 2. keyword overrides for well-known emotion phrases
//! 3. the statistical emotion classifier
//!
//! Cheap deterministic rules run first; the classifier is only consulted when
//! both of them miss.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    services::{
        features::{GenreSet, GENRE_VOCABULARY},
        providers::EmotionClassifier,
        text::WordSequence,
    },
};

/// Label reported when the query names genres directly
pub const CUSTOM_GENRE_LABEL: &str = "custom genre";

/// Static emotion → genre affinity table
pub fn genres_for_emotion(label: &str) -> GenreSet {
    let genres: &[&'static str] = match label {
        "anger" => &["action", "crime", "war"],
        "disgust" => &["crime", "thriller"],
        "fear" => &["horror", "thriller", "mystery"],
        "joy" => &["comedy", "family", "animation", "music"],
        "love" => &["romance", "drama"],
        "sadness" => &["drama", "romance"],
        "surprise" => &["mystery", "science fiction", "fantasy", "adventure"],
        _ => &[],
    };
    genres.iter().copied().collect()
}

/// Keyword overrides, checked in this order
const KEYWORD_OVERRIDES: &[(&str, &[&str])] = &[
    (
        "fear",
        &["terrified", "afraid", "scared", "frightened", "spooked", "creeped out"],
    ),
    (
        "sadness",
        &["sad", "depressed", "heartbroken", "lonely", "feeling down", "grieving"],
    ),
    (
        "joy",
        &["happy", "cheerful", "joyful", "excited", "feel good", "in a great mood"],
    ),
    ("anger", &["angry", "furious", "pissed off", "enraged", "livid"]),
    ("love", &["in love", "romantic", "lovesick", "date night"]),
    ("surprise", &["surprised", "shocked", "amazed", "astonished", "mind blown"]),
    ("disgust", &["disgusted", "grossed out", "repulsed"]),
];

/// Which resolver produced a [`Resolution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    ExplicitGenre,
    KeywordOverride,
    Classifier,
    /// No resolver produced an answer
    Default,
}

/// Outcome of routing a mood query
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub genres: GenreSet,
    pub label: String,
    pub source: ResolutionSource,
}

/// One stage of the precedence chain. `Ok(None)` passes to the next stage.
#[async_trait::async_trait]
pub trait GenreResolver: Send + Sync {
    async fn resolve(&self, query: &WordSequence, raw: &str) -> AppResult<Option<Resolution>>;

    fn name(&self) -> &'static str;
}

/// Matches vocabulary genre names mentioned in the query
pub struct ExplicitGenreResolver;

#[async_trait::async_trait]
impl GenreResolver for ExplicitGenreResolver {
    async fn resolve(&self, query: &WordSequence, _raw: &str) -> AppResult<Option<Resolution>> {
        let genres: GenreSet = GENRE_VOCABULARY
            .iter()
            .copied()
            .filter(|genre| query.contains_phrase(genre))
            .collect();

        if genres.is_empty() {
            return Ok(None);
        }

        Ok(Some(Resolution {
            genres,
            label: CUSTOM_GENRE_LABEL.to_string(),
            source: ResolutionSource::ExplicitGenre,
        }))
    }

    fn name(&self) -> &'static str {
        "explicit-genre"
    }
}

/// Maps trigger phrases to an emotion, first emotion in table order wins
pub struct KeywordOverrideResolver;

#[async_trait::async_trait]
impl GenreResolver for KeywordOverrideResolver {
    async fn resolve(&self, query: &WordSequence, _raw: &str) -> AppResult<Option<Resolution>> {
        let matched = KEYWORD_OVERRIDES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| query.contains_phrase(k)));

        Ok(matched.map(|(label, _)| Resolution {
            genres: genres_for_emotion(label),
            label: label.to_string(),
            source: ResolutionSource::KeywordOverride,
        }))
    }

    fn name(&self) -> &'static str {
        "keyword-override"
    }
}

/// Falls back to the emotion classifier's top label.
///
/// Tied confidences go to the earliest label in the classifier's output.
pub struct ClassifierResolver {
    classifier: Arc<dyn EmotionClassifier>,
}

impl ClassifierResolver {
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait::async_trait]
impl GenreResolver for ClassifierResolver {
    async fn resolve(&self, _query: &WordSequence, raw: &str) -> AppResult<Option<Resolution>> {
        let scores = self.classifier.classify(raw).await?;

        let top = scores
            .into_iter()
            .min_by(|a, b| b.score.total_cmp(&a.score))
            .ok_or_else(|| {
                AppError::ModelUnavailable(format!(
                    "{}: classifier returned no labels",
                    self.classifier.name()
                ))
            })?;

        let genres = genres_for_emotion(&top.label);
        if genres.is_empty() {
            tracing::debug!(label = %top.label, "Classifier label has no genre mapping");
        }

        Ok(Some(Resolution {
            genres,
            label: top.label,
            source: ResolutionSource::Classifier,
        }))
    }

    fn name(&self) -> &'static str {
        "classifier"
    }
}

/// Resolves mood text to target genres by trying each resolver in order
pub struct EmotionRouter {
    resolvers: Vec<Box<dyn GenreResolver>>,
}

impl EmotionRouter {
    /// The standard chain: explicit genre, keyword override, classifier
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        let resolvers: Vec<Box<dyn GenreResolver>> = vec![
            Box::new(ExplicitGenreResolver),
            Box::new(KeywordOverrideResolver),
            Box::new(ClassifierResolver::new(classifier)),
        ];
        Self::with_resolvers(resolvers)
    }

    pub fn with_resolvers(resolvers: Vec<Box<dyn GenreResolver>>) -> Self {
        Self { resolvers }
    }

    pub async fn resolve(&self, query: &str) -> AppResult<Resolution> {
        let words = WordSequence::new(query);

        for resolver in &self.resolvers {
            if let Some(resolution) = resolver.resolve(&words, query).await? {
                tracing::debug!(
                    resolver = resolver.name(),
                    label = %resolution.label,
                    genres = ?resolution.genres,
                    "Mood query resolved"
                );
                return Ok(resolution);
            }
        }

        Ok(Resolution {
            genres: GenreSet::new(),
            label: "neutral".to_string(),
            source: ResolutionSource::Default,
        })
    }
}
