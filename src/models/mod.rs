use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;

pub mod requests;

pub use requests::{
    EmotionRecommendRequest, EmotionRecommendResponse, IndividualRecommendation,
    RecommendRequest, RecommendResponse,
};

/// Kind of catalog entry.
///
/// Parsed case-insensitively from the wire `type` field. Unknown kinds are kept
/// as their own category so they never collide with movies or shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Movie,
    Show,
    Other(String),
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        let lowered = value.trim().to_lowercase();
        match lowered.as_str() {
            "movie" => Category::Movie,
            "show" | "tv" | "series" => Category::Show,
            _ => Category::Other(lowered),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.to_string()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Movie => write!(f, "movie"),
            Category::Show => write!(f, "show"),
            Category::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A movie or show offered by the caller, either as a favorite or as a discover candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    /// Free-text descriptors, genre words included
    pub tags: String,
    #[serde(alias = "poster_path")]
    pub poster_path: String,
    /// Best-effort date string, may be empty or unparsable
    #[serde(alias = "release_date")]
    pub release_date: String,
    #[serde(alias = "vote_average", deserialize_with = "finite_f32")]
    pub vote_average: f32,
    #[serde(rename = "type")]
    pub category: Category,
}

impl CatalogItem {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            id: self.id,
            category: self.category.clone(),
        }
    }
}

/// Identity of a catalog entry. A movie and a show may share a numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub id: i64,
    pub category: Category,
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category, self.id)
    }
}

/// A catalog item as returned to the client, with its score fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Final blended score used for ranking
    pub score: f32,
    /// Cosine similarity component of the score
    pub similarity: f32,
}

/// Numbers outside the f32 range would otherwise become infinite and poison batch scaling
fn finite_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f32::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(de::Error::custom(format!("expected a finite number, got {}", value)))
    }
}
