use serde::{Deserialize, Serialize};

use super::{CatalogItem, ScoredItem};

/// Body of `POST /recommend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Items the user already likes. Never recommended back.
    pub favorites: Vec<CatalogItem>,
    /// Candidate pool for this request
    pub discover: Vec<CatalogItem>,
}

/// Suggestions derived from a single favorite
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRecommendation {
    /// Title of the favorite the suggestions are based on
    pub based_on: String,
    pub suggestions: Vec<ScoredItem>,
}

/// Response of `POST /recommend`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendResponse {
    pub general: Vec<ScoredItem>,
    pub individual: Vec<IndividualRecommendation>,
}

/// Body of `POST /emotion-recommend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionRecommendRequest {
    /// Free-form mood description
    pub text: String,
    pub discover: Vec<CatalogItem>,
}

/// Response of `POST /emotion-recommend`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionRecommendResponse {
    /// Resolved emotion label, or "custom genre" when the text names genres directly
    pub emotion: String,
    pub recommended: Vec<ScoredItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_individual_recommendation_uses_based_on_key() {
        let rec = IndividualRecommendation {
            based_on: "Heat".to_string(),
            suggestions: vec![],
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value, json!({ "basedOn": "Heat", "suggestions": [] }));
    }

    #[test]
    fn test_recommend_request_requires_discover() {
        let result = serde_json::from_value::<RecommendRequest>(json!({ "favorites": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_emotion_request_rejects_mistyped_text() {
        let result = serde_json::from_value::<EmotionRecommendRequest>(json!({
            "text": 12,
            "discover": []
        }));
        assert!(result.is_err());
    }
}
