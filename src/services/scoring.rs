//! Scoring engine: blends embedding similarity with batch-relative bonuses.
//!
//! Every score has the same shape, with fixed weights per query context:
//!
//! ```text
//! similarity·cos(reference, item)
//!     + type·typeBonus + vote·voteBonus + year·yearBonus + genre·genreOverlap
//! ```

use crate::{
    models::CatalogItem,
    services::features::{genre_overlap_bonus, FeatureVector, GenreSet},
};

/// Fixed blend weights for one query context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub similarity: f32,
    pub type_bonus: f32,
    pub vote: f32,
    pub year: f32,
    pub genre: f32,
}

/// General recommendations against the mean favorite profile
pub const PROFILE_WEIGHTS: Weights = Weights {
    similarity: 1.0,
    type_bonus: 0.1,
    vote: 0.2,
    year: 0.1,
    genre: 0.3,
};

/// Per-favorite suggestions. No quality terms, topical closeness only.
pub const SINGLE_ITEM_WEIGHTS: Weights = Weights {
    similarity: 1.0,
    type_bonus: 0.1,
    vote: 0.0,
    year: 0.0,
    genre: 0.4,
};

/// Mood-text queries
pub const MOOD_WEIGHTS: Weights = Weights {
    similarity: 0.6,
    type_bonus: 0.0,
    vote: 0.1,
    year: 0.1,
    genre: 0.2,
};

/// A discover item with its score for one query context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub item: &'a CatalogItem,
    pub score: f32,
    pub similarity: f32,
}

/// Discover items with their features and embeddings, index-aligned
#[derive(Debug)]
pub struct CandidateBatch<'a> {
    pub items: &'a [CatalogItem],
    pub features: Vec<FeatureVector>,
    pub vectors: Vec<Vec<f32>>,
}

impl<'a> CandidateBatch<'a> {
    pub fn new(
        items: &'a [CatalogItem],
        features: Vec<FeatureVector>,
        vectors: Vec<Vec<f32>>,
    ) -> Self {
        debug_assert_eq!(items.len(), features.len());
        debug_assert_eq!(items.len(), vectors.len());
        Self {
            items,
            features,
            vectors,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Scores every item against `reference` and `target_genres`, in batch order
    pub fn score(
        &self,
        reference: &[f32],
        target_genres: &GenreSet,
        weights: &Weights,
    ) -> Vec<ScoredCandidate<'a>> {
        let genre_bonus = genre_overlap_bonus(&self.features, target_genres);

        self.items
            .iter()
            .zip(&self.features)
            .zip(&self.vectors)
            .zip(genre_bonus)
            .map(|(((item, feature), vector), genre)| {
                let similarity = cosine_similarity(reference, vector);
                let score = weights.similarity * similarity
                    + weights.type_bonus * feature.type_bonus
                    + weights.vote * feature.vote_bonus
                    + weights.year * feature.year_bonus
                    + weights.genre * genre;
                ScoredCandidate {
                    item,
                    score,
                    similarity,
                }
            })
            .collect()
    }

    /// General recommendations: mean favorite vector, union of favorite genres
    pub fn score_profile(
        &self,
        profile: &[f32],
        favorite_genres: &GenreSet,
    ) -> Vec<ScoredCandidate<'a>> {
        self.score(profile, favorite_genres, &PROFILE_WEIGHTS)
    }

    /// Suggestions for one favorite
    pub fn score_single(
        &self,
        favorite: &[f32],
        favorite_genres: &GenreSet,
    ) -> Vec<ScoredCandidate<'a>> {
        self.score(favorite, favorite_genres, &SINGLE_ITEM_WEIGHTS)
    }

    /// Mood queries: query vector, genres chosen by the emotion router
    pub fn score_mood(&self, query: &[f32], target_genres: &GenreSet) -> Vec<ScoredCandidate<'a>> {
        self.score(query, target_genres, &MOOD_WEIGHTS)
    }
}

/// Cosine similarity in `[-1, 1]`. Zero vectors and mismatched lengths score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Element-wise mean of equally sized vectors; `None` for an empty input
pub fn mean_vector(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let mut mean = vec![0.0f32; first.len()];
    for vector in vectors {
        for (acc, value) in mean.iter_mut().zip(vector) {
            *acc += value;
        }
    }
    let count = vectors.len() as f32;
    for value in &mut mean {
        *value /= count;
    }
    Some(mean)
}

/// Union of the genre sets of `features`
pub fn genre_union<'f>(features: impl IntoIterator<Item = &'f FeatureVector>) -> GenreSet {
    features
        .into_iter()
        .flat_map(|feature| feature.genre_set.iter().copied())
        .collect()
}
