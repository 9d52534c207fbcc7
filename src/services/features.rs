use chrono::{DateTime, Datelike, NaiveDate};
use std::collections::{BTreeSet, HashMap};

use crate::models::{CatalogItem, Category};
use crate::services::text::{normalize, WordSequence};

/// Controlled genre vocabulary. Multi-word genres are matched as phrases.
pub const GENRE_VOCABULARY: [&str; 19] = [
    "action",
    "adventure",
    "animation",
    "comedy",
    "crime",
    "documentary",
    "drama",
    "family",
    "fantasy",
    "history",
    "horror",
    "music",
    "mystery",
    "romance",
    "science fiction",
    "tv movie",
    "thriller",
    "war",
    "western",
];

/// Guards min-max scaling against zero-variance batches
const EPSILON: f32 = 1e-6;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

pub type GenreSet = BTreeSet<&'static str>;

/// Per-candidate signals derived from one discover batch
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub release_year: Option<i32>,
    pub genre_set: GenreSet,
    /// Normalized title + tags + category + year, the text that gets embedded
    pub combined_text: String,
    pub vote_bonus: f32,
    pub year_bonus: f32,
    pub type_bonus: f32,
}

/// Genres from the vocabulary mentioned in `text`
pub fn extract_genres(text: &str) -> GenreSet {
    let words = WordSequence::new(text);
    GENRE_VOCABULARY
        .iter()
        .copied()
        .filter(|genre| words.contains_phrase(genre))
        .collect()
}

/// Best-effort year extraction from a release date string
pub fn parse_release_year(release_date: &str) -> Option<i32> {
    let trimmed = release_date.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.year());
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.year());
    }

    // Partial dates such as "1999" or "1999-03"
    let prefix = trimmed.get(..4)?;
    let rest = &trimmed[4..];
    if prefix.chars().all(|c| c.is_ascii_digit())
        && (rest.is_empty() || rest.starts_with('-') || rest.starts_with('/'))
    {
        return prefix.parse().ok();
    }

    None
}

/// Scales values into `[0, 1]` relative to the batch: `(x - min) / (max - min + ε)`.
///
/// A batch with no spread maps to all zeros.
pub fn min_max_normalize(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min + EPSILON;

    values
        .iter()
        .map(|value| ((value - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// The text embedded for an item: title, tags, category and year, normalized
pub fn combined_text(item: &CatalogItem, release_year: Option<i32>) -> String {
    let year = release_year.map(|y| y.to_string()).unwrap_or_default();
    normalize(&format!(
        "{} {} {} {}",
        item.title, item.tags, item.category, year
    ))
}

/// Most frequent category among the reference items; ties go to the earliest seen
pub fn dominant_category(reference: &[CatalogItem]) -> Option<&Category> {
    let mut counts: HashMap<&Category, usize> = HashMap::new();
    for item in reference {
        *counts.entry(&item.category).or_insert(0) += 1;
    }

    let mut best: Option<(&Category, usize)> = None;
    for item in reference {
        let count = counts[&item.category];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((&item.category, count));
        }
    }

    best.map(|(category, _)| category)
}

/// Features for a single item outside of any batch (favorites, for example).
/// Bonus fields are left at zero.
pub fn describe(item: &CatalogItem) -> FeatureVector {
    let release_year = parse_release_year(&item.release_date);
    FeatureVector {
        release_year,
        genre_set: extract_genres(&item.tags),
        combined_text: combined_text(item, release_year),
        vote_bonus: 0.0,
        year_bonus: 0.0,
        type_bonus: 0.0,
    }
}

/// Extracts features for a whole discover batch.
///
/// Vote, year and type bonuses are scaled against this batch only, so the same
/// item can receive different bonuses in requests with different candidate pools.
/// `reference` is the set whose dominant category earns the type bonus; without
/// one no item gets it.
pub fn extract_features(
    items: &[CatalogItem],
    reference: Option<&[CatalogItem]>,
) -> Vec<FeatureVector> {
    let target_category = reference.and_then(dominant_category);

    let mut features: Vec<FeatureVector> = items.iter().map(describe).collect();

    let votes: Vec<f32> = items.iter().map(|item| item.vote_average).collect();
    let years: Vec<f32> = items
        .iter()
        .zip(&features)
        .map(|(item, feature)| match feature.release_year {
            Some(year) => year as f32,
            None => {
                tracing::debug!(
                    item = %item.key(),
                    release_date = %item.release_date,
                    "Unparsable release date, treating year as 0"
                );
                0.0
            }
        })
        .collect();
    let type_matches: Vec<f32> = items
        .iter()
        .map(|item| match target_category {
            Some(category) if *category == item.category => 1.0,
            _ => 0.0,
        })
        .collect();

    let vote_bonus = min_max_normalize(&votes);
    let year_bonus = min_max_normalize(&years);
    let type_bonus = min_max_normalize(&type_matches);

    for (i, feature) in features.iter_mut().enumerate() {
        feature.vote_bonus = vote_bonus[i];
        feature.year_bonus = year_bonus[i];
        feature.type_bonus = type_bonus[i];
    }

    features
}

/// Batch-normalized size of each candidate's genre intersection with `target`.
///
/// An empty target yields zero bonus for every candidate.
pub fn genre_overlap_bonus(features: &[FeatureVector], target: &GenreSet) -> Vec<f32> {
    let overlaps: Vec<f32> = features
        .iter()
        .map(|feature| feature.genre_set.intersection(target).count() as f32)
        .collect();
    min_max_normalize(&overlaps)
}
