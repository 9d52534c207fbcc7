/// Local feature-hashing embedder
///
/// Maps each token to a signed bucket of a fixed-size vector (FNV-1a), weights by
/// sublinear term frequency and L2-normalizes. Texts sharing vocabulary land close
/// together in cosine space, which is all the scoring engine asks of an embedder.
use std::collections::HashMap;

use tracing::instrument;

use crate::{
    error::AppResult,
    services::{providers::EmbeddingProvider, text::tokenize},
};

const DEFAULT_DIMENSIONS: usize = 512;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "it", "in", "on", "of", "to", "and", "or", "for", "with", "this",
    "that", "be", "are", "was", "were", "i", "im", "m", "me", "my", "you", "we", "they", "he",
    "she", "his", "her", "its", "at", "by", "from", "as", "but", "so", "some", "something",
    "want", "feel", "feeling", "watch",
];

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embeds a single text. Text without content words maps to the zero vector.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            if !STOP_WORDS.contains(&token.as_str()) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for (token, count) in counts {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign * (1.0 + (count as f32).ln());
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingEmbedder {
    #[instrument(skip(self, texts), fields(batch = texts.len()))]
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}
