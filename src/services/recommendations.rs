use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{
        EmotionRecommendRequest, EmotionRecommendResponse, IndividualRecommendation, ItemKey,
        RecommendRequest, RecommendResponse, ScoredItem,
    },
    services::{
        emotion::EmotionRouter,
        features::{describe, extract_features, FeatureVector},
        providers::{EmbeddingProvider, Providers},
        scoring::{genre_union, mean_vector, CandidateBatch},
        selection::{select, UsedKeys, GENERAL_LIMIT, MOOD_LIMIT, PER_FAVORITE_LIMIT},
        text::normalize,
    },
};

/// Request-level recommendation flows.
///
/// Holds only the injected model handles; every structure derived from a request
/// lives and dies inside that request.
pub struct Recommender {
    embedder: Arc<dyn EmbeddingProvider>,
    router: EmotionRouter,
}

impl Recommender {
    pub fn new(providers: Providers) -> Self {
        Self {
            embedder: providers.embedder,
            router: EmotionRouter::new(providers.classifier),
        }
    }

    /// Embeds all texts in a single model call and checks the result shape
    async fn embed_all(&self, texts: Vec<String>) -> AppResult<Vec<Vec<f32>>> {
        let expected = texts.len();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != expected {
            return Err(AppError::ModelUnavailable(format!(
                "{}: expected {} vectors, got {}",
                self.embedder.name(),
                expected,
                vectors.len()
            )));
        }
        Ok(vectors)
    }

    /// General and per-favorite recommendations.
    ///
    /// Favorites are never recommended back. Per-favorite lists are built in
    /// input order and never share an item.
    pub async fn recommend(&self, request: &RecommendRequest) -> AppResult<RecommendResponse> {
        let start = Instant::now();
        let favorites = &request.favorites;
        let discover = &request.discover;

        if favorites.is_empty() || discover.is_empty() {
            tracing::info!(
                favorites = favorites.len(),
                discover = discover.len(),
                "Nothing to score, returning empty recommendations"
            );
            return Ok(RecommendResponse::default());
        }

        let discover_features = extract_features(discover, Some(favorites.as_slice()));
        let favorite_features: Vec<FeatureVector> = favorites.iter().map(describe).collect();

        let texts: Vec<String> = discover_features
            .iter()
            .chain(&favorite_features)
            .map(|feature| feature.combined_text.clone())
            .collect();
        let mut vectors = self.embed_all(texts).await?;
        let favorite_vectors = vectors.split_off(discover.len());

        let batch = CandidateBatch::new(discover, discover_features, vectors);
        let exclude: HashSet<ItemKey> = favorites.iter().map(|item| item.key()).collect();

        let profile = mean_vector(&favorite_vectors).unwrap_or_default();
        let favorite_genres = genre_union(&favorite_features);
        if favorite_genres.is_empty() {
            tracing::debug!("Favorites carry no known genres, genre bonus disabled for profile");
        }

        let general: Vec<ScoredItem> = select(
            batch.score_profile(&profile, &favorite_genres),
            &exclude,
            &HashSet::new(),
            GENERAL_LIMIT,
        )
        .into_iter()
        .map(ScoredItem::from)
        .collect();

        let (used, individual) = favorites
            .iter()
            .zip(&favorite_features)
            .zip(&favorite_vectors)
            .fold(
                (UsedKeys::new(), Vec::with_capacity(favorites.len())),
                |(used, mut individual), ((favorite, features), vector)| {
                    let scored = batch.score_single(vector, &features.genre_set);
                    let (used, suggestions) = used.select(scored, &exclude, PER_FAVORITE_LIMIT);
                    individual.push(IndividualRecommendation {
                        based_on: favorite.title.clone(),
                        suggestions: suggestions.into_iter().map(ScoredItem::from).collect(),
                    });
                    (used, individual)
                },
            );

        tracing::info!(
            favorites = favorites.len(),
            discover = batch.len(),
            general = general.len(),
            individual_items = used.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations computed"
        );

        Ok(RecommendResponse {
            general,
            individual,
        })
    }

    /// Recommendations for a free-text mood
    pub async fn recommend_for_mood(
        &self,
        request: &EmotionRecommendRequest,
    ) -> AppResult<EmotionRecommendResponse> {
        let start = Instant::now();
        let discover = &request.discover;

        if discover.is_empty() {
            let resolution = self.router.resolve(&request.text).await?;
            tracing::info!(emotion = %resolution.label, "Empty discover batch for mood query");
            return Ok(EmotionRecommendResponse {
                emotion: resolution.label,
                recommended: Vec::new(),
            });
        }

        let features = extract_features(discover, None);
        let texts: Vec<String> = features
            .iter()
            .map(|feature| feature.combined_text.clone())
            .chain(std::iter::once(normalize(&request.text)))
            .collect();

        // The two models are independent; route and embed concurrently
        let (resolution, mut vectors) =
            tokio::try_join!(self.router.resolve(&request.text), self.embed_all(texts))?;
        let query = vectors.pop().unwrap_or_default();

        let batch = CandidateBatch::new(discover, features, vectors);
        let recommended: Vec<ScoredItem> = select(
            batch.score_mood(&query, &resolution.genres),
            &HashSet::new(),
            &HashSet::new(),
            MOOD_LIMIT,
        )
        .into_iter()
        .map(ScoredItem::from)
        .collect();

        tracing::info!(
            emotion = %resolution.label,
            source = ?resolution.source,
            genres = ?resolution.genres,
            discover = batch.len(),
            recommended = recommended.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Mood recommendations computed"
        );

        Ok(EmotionRecommendResponse {
            emotion: resolution.label,
            recommended,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItem, Category};
    use crate::services::providers::{
        HashingEmbedder, LexiconClassifier, MockEmbeddingProvider, MockEmotionClassifier,
    };

    fn movie(id: i64, title: &str, tags: &str, vote: f32) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            tags: tags.to_string(),
            poster_path: format!("/{}.jpg", id),
            release_date: "2015-06-01".to_string(),
            vote_average: vote,
            category: Category::Movie,
        }
    }

    fn local_recommender() -> Recommender {
        Recommender::new(Providers {
            embedder: Arc::new(HashingEmbedder::default()),
            classifier: Arc::new(LexiconClassifier::new()),
        })
    }

    fn recommender_with(
        embedder: MockEmbeddingProvider,
        classifier: MockEmotionClassifier,
    ) -> Recommender {
        Recommender::new(Providers {
            embedder: Arc::new(embedder),
            classifier: Arc::new(classifier),
        })
    }

    fn catalog() -> Vec<CatalogItem> {
        vec![
            movie(1, "Car Chase", "action heist cars explosions", 7.0),
            movie(2, "Quiet Love", "romance drama letters", 6.5),
            movie(3, "Cartoon Fun", "animation family talking animals", 7.5),
            movie(4, "Street Heist", "action crime heist getaway cars", 7.2),
            movie(5, "Ghost House", "horror haunted house ghosts", 6.0),
            movie(6, "Space Saga", "science fiction space battles", 8.0),
        ]
    }

    #[tokio::test]
    async fn test_empty_favorites_skip_the_embedder() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed().never();
        embedder.expect_name().return_const("mock");
        let recommender = recommender_with(embedder, MockEmotionClassifier::new());

        let response = recommender
            .recommend(&RecommendRequest {
                favorites: vec![],
                discover: catalog(),
            })
            .await
            .unwrap();

        assert!(response.general.is_empty());
        assert!(response.individual.is_empty());
    }

    #[tokio::test]
    async fn test_single_embedding_call_per_request() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .times(1)
            .withf(|texts| texts.len() == 7)
            .returning(|texts| {
                let embedder = HashingEmbedder::new(64);
                Ok(texts.iter().map(|t| embedder.embed_one(t)).collect())
            });
        embedder.expect_name().return_const("mock");
        let recommender = recommender_with(embedder, MockEmotionClassifier::new());

        let response = recommender
            .recommend(&RecommendRequest {
                favorites: vec![movie(100, "Fast Cars", "action cars", 8.0)],
                discover: catalog(),
            })
            .await
            .unwrap();
        assert_eq!(response.individual.len(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fatal() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .returning(|_| Err(AppError::ModelUnavailable("down".to_string())));
        embedder.expect_name().return_const("mock");
        let recommender = recommender_with(embedder, MockEmotionClassifier::new());

        let result = recommender
            .recommend(&RecommendRequest {
                favorites: vec![movie(100, "Fast Cars", "action cars", 8.0)],
                discover: catalog(),
            })
            .await;
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_short_embedding_batch_is_rejected() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed().returning(|_| Ok(vec![vec![1.0]]));
        embedder.expect_name().return_const("mock");
        let recommender = recommender_with(embedder, MockEmotionClassifier::new());

        let result = recommender
            .recommend(&RecommendRequest {
                favorites: vec![movie(100, "Fast Cars", "action cars", 8.0)],
                discover: catalog(),
            })
            .await;
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_favorites_are_excluded_everywhere() {
        let discover = catalog();
        let favorites = vec![discover[0].clone(), discover[4].clone()];

        let response = local_recommender()
            .recommend(&RecommendRequest {
                favorites: favorites.clone(),
                discover,
            })
            .await
            .unwrap();

        let excluded: HashSet<ItemKey> = favorites.iter().map(|f| f.key()).collect();
        assert!(response.general.iter().all(|s| !excluded.contains(&s.item.key())));
        for entry in &response.individual {
            assert!(entry.suggestions.iter().all(|s| !excluded.contains(&s.item.key())));
        }
    }

    #[tokio::test]
    async fn test_individual_lists_are_disjoint_and_first_favorite_wins() {
        let favorites = vec![
            movie(100, "Big Heist", "action heist cars", 8.0),
            movie(101, "Bigger Heist", "action heist cars", 7.0),
        ];

        let response = local_recommender()
            .recommend(&RecommendRequest {
                favorites,
                discover: catalog(),
            })
            .await
            .unwrap();

        assert_eq!(response.individual[0].based_on, "Big Heist");
        assert_eq!(response.individual[1].based_on, "Bigger Heist");

        let first: HashSet<ItemKey> = response.individual[0]
            .suggestions
            .iter()
            .map(|s| s.item.key())
            .collect();
        let second: HashSet<ItemKey> = response.individual[1]
            .suggestions
            .iter()
            .map(|s| s.item.key())
            .collect();
        assert!(first.is_disjoint(&second));

        // Both favorites are closest to the heist movies; the first favorite takes them
        assert!(first.contains(&ItemKey { id: 4, category: Category::Movie }));
        assert!(first.contains(&ItemKey { id: 1, category: Category::Movie }));
        assert_eq!(first.len(), PER_FAVORITE_LIMIT);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_mood_keyword_override_skips_classifier() {
        let mut classifier = MockEmotionClassifier::new();
        classifier.expect_classify().never();
        classifier.expect_name().return_const("mock");
        let recommender = Recommender::new(Providers {
            embedder: Arc::new(HashingEmbedder::default()),
            classifier: Arc::new(classifier),
        });

        let response = recommender
            .recommend_for_mood(&EmotionRecommendRequest {
                text: "I'm terrified, something with ghosts".to_string(),
                discover: catalog(),
            })
            .await
            .unwrap();

        assert_eq!(response.emotion, "fear");
        assert_eq!(response.recommended[0].item.id, 5);
        assert!(response.recommended.len() <= MOOD_LIMIT);
    }

    #[tokio::test]
    async fn test_mood_with_empty_discover_still_reports_emotion() {
        let response = local_recommender()
            .recommend_for_mood(&EmotionRecommendRequest {
                text: "I want a comedy".to_string(),
                discover: vec![],
            })
            .await
            .unwrap();

        assert_eq!(response.emotion, "custom genre");
        assert!(response.recommended.is_empty());
    }

    #[tokio::test]
    async fn test_mood_classifier_failure_is_fatal() {
        let mut classifier = MockEmotionClassifier::new();
        classifier
            .expect_classify()
            .returning(|_| Err(AppError::ModelUnavailable("timeout".to_string())));
        classifier.expect_name().return_const("mock");
        let recommender = Recommender::new(Providers {
            embedder: Arc::new(HashingEmbedder::default()),
            classifier: Arc::new(classifier),
        });

        let result = recommender
            .recommend_for_mood(&EmotionRecommendRequest {
                text: "meh".to_string(),
                discover: catalog(),
            })
            .await;
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));
    }
}
