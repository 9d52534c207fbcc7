/// Local lexicon-based emotion classifier
///
/// Counts lexicon hits per label and turns them into confidences with a softmax.
/// Every label is always returned. `neutral` carries a small prior so that text
/// without any emotional vocabulary resolves to it.
use tracing::instrument;

use crate::{
    error::AppResult,
    services::{
        providers::{EmotionClassifier, EmotionScore},
        text::tokenize,
    },
};

const NEUTRAL_PRIOR: f32 = 0.5;

/// Labels in enumeration order; ties in confidence keep this order
pub const LABELS: [&str; 8] = [
    "anger", "disgust", "fear", "joy", "love", "neutral", "sadness", "surprise",
];

fn lexicon(label: &str) -> &'static [&'static str] {
    match label {
        "anger" => &[
            "angry", "anger", "furious", "rage", "mad", "annoyed", "irritated", "hate",
            "frustrated", "pissed", "revenge",
        ],
        "disgust" => &[
            "disgusted", "disgusting", "gross", "nasty", "sick", "repulsed", "revolting", "vile",
        ],
        "fear" => &[
            "afraid", "scared", "fear", "terrified", "frightened", "nervous", "anxious",
            "panic", "creepy", "spooky", "dread", "worried", "haunted",
        ],
        "joy" => &[
            "happy", "joy", "cheerful", "glad", "excited", "fun", "delighted", "great",
            "awesome", "laugh", "celebrate", "upbeat",
        ],
        "love" => &[
            "love", "loving", "romantic", "romance", "crush", "date", "adore", "sweetheart",
            "valentine",
        ],
        "sadness" => &[
            "sad", "unhappy", "depressed", "lonely", "cry", "crying", "heartbroken", "grief",
            "miserable", "down", "blue", "tears",
        ],
        "surprise" => &[
            "surprised", "surprise", "shocked", "amazed", "astonished", "unexpected", "wow",
            "curious", "twist",
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Scores every label for `text`, ranked by descending confidence
    pub fn score(&self, text: &str) -> Vec<EmotionScore> {
        let tokens = tokenize(text);

        let hits: Vec<f32> = LABELS
            .iter()
            .map(|label| {
                let words = lexicon(label);
                let count = tokens.iter().filter(|t| words.contains(&t.as_str())).count() as f32;
                if *label == "neutral" {
                    count + NEUTRAL_PRIOR
                } else {
                    count
                }
            })
            .collect();

        let max = hits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = hits.iter().map(|h| (h - max).exp()).collect();
        let total: f32 = exps.iter().sum();

        let mut scores: Vec<EmotionScore> = LABELS
            .iter()
            .zip(exps)
            .map(|(label, e)| EmotionScore {
                label: label.to_string(),
                score: e / total,
            })
            .collect();

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for LexiconClassifier {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn classify(&self, text: &str) -> AppResult<Vec<EmotionScore>> {
        Ok(self.score(text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
