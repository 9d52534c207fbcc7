//! Ranking, de-duplication and truncation of scored candidates.

use std::collections::HashSet;

use crate::{
    models::{ItemKey, ScoredItem},
    services::scoring::ScoredCandidate,
};

/// Result size for general recommendations
pub const GENERAL_LIMIT: usize = 20;
/// Result size per favorite
pub const PER_FAVORITE_LIMIT: usize = 5;
/// Result size for mood queries
pub const MOOD_LIMIT: usize = 10;

/// Orders candidates by descending score and keeps the first `limit` unique keys.
///
/// Candidates whose key is in `exclude` or `used` are dropped first. The sort is
/// stable, so equal scores keep their batch order. A key seen twice within one
/// call (duplicate catalog entries) is emitted once.
pub fn select<'a>(
    mut scored: Vec<ScoredCandidate<'a>>,
    exclude: &HashSet<ItemKey>,
    used: &HashSet<ItemKey>,
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    scored.retain(|candidate| {
        let key = candidate.item.key();
        !exclude.contains(&key) && !used.contains(&key)
    });
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(limit.min(scored.len()));
    for candidate in scored {
        if selected.len() >= limit {
            break;
        }
        if seen.insert(candidate.item.key()) {
            selected.push(candidate);
        }
    }

    selected
}

/// Keys already handed out to earlier favorites within one request.
///
/// Threaded through the per-favorite loop as an explicit accumulator: each call to
/// [`UsedKeys::select`] excludes what earlier favorites took and records what it
/// emits, so the first favorite in input order wins a contested item.
#[derive(Debug, Default, Clone)]
pub struct UsedKeys {
    keys: HashSet<ItemKey>,
}

impl UsedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selects up to `limit` candidates not excluded or previously used, and marks them used
    pub fn select<'a>(
        mut self,
        scored: Vec<ScoredCandidate<'a>>,
        exclude: &HashSet<ItemKey>,
        limit: usize,
    ) -> (Self, Vec<ScoredCandidate<'a>>) {
        let selected = select(scored, exclude, &self.keys, limit);
        self.keys
            .extend(selected.iter().map(|candidate| candidate.item.key()));
        (self, selected)
    }
}

impl From<ScoredCandidate<'_>> for ScoredItem {
    fn from(candidate: ScoredCandidate<'_>) -> Self {
        ScoredItem {
            item: candidate.item.clone(),
            score: candidate.score,
            similarity: candidate.similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItem, Category};
    use crate::services::features::tests::item;

    fn scored<'a>(items: &'a [CatalogItem], scores: &[f32]) -> Vec<ScoredCandidate<'a>> {
        items
            .iter()
            .zip(scores)
            .map(|(item, score)| ScoredCandidate {
                item,
                score: *score,
                similarity: *score,
            })
            .collect()
    }

    fn ids(selected: &[ScoredCandidate<'_>]) -> Vec<i64> {
        selected.iter().map(|c| c.item.id).collect()
    }

    #[test]
    fn test_orders_by_descending_score() {
        let items: Vec<_> = (1..=4).map(|i| item(i, "", "", 0.0, Category::Movie)).collect();
        let selected = select(
            scored(&items, &[0.1, 0.9, 0.5, 0.7]),
            &HashSet::new(),
            &HashSet::new(),
            10,
        );
        assert_eq!(ids(&selected), vec![2, 4, 3, 1]);
        assert!(selected.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_keep_batch_order() {
        let items: Vec<_> = (1..=3).map(|i| item(i, "", "", 0.0, Category::Movie)).collect();
        let selected = select(
            scored(&items, &[0.5, 0.5, 0.5]),
            &HashSet::new(),
            &HashSet::new(),
            10,
        );
        assert_eq!(ids(&selected), vec![1, 2, 3]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let items: Vec<_> = (1..=30).map(|i| item(i, "", "", 0.0, Category::Movie)).collect();
        let scores: Vec<f32> = (1..=30).map(|i| i as f32).collect();
        let selected = select(
            scored(&items, &scores),
            &HashSet::new(),
            &HashSet::new(),
            GENERAL_LIMIT,
        );
        assert_eq!(selected.len(), GENERAL_LIMIT);
        assert_eq!(selected[0].item.id, 30);
    }

    #[test]
    fn test_drops_duplicate_keys_within_call() {
        let items = vec![
            item(1, "", "", 0.0, Category::Movie),
            item(1, "", "", 0.0, Category::Movie),
            item(1, "", "", 0.0, Category::Show),
        ];
        let selected = select(
            scored(&items, &[0.9, 0.8, 0.7]),
            &HashSet::new(),
            &HashSet::new(),
            10,
        );
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].item.category, Category::Movie);
        assert_eq!(selected[1].item.category, Category::Show);
    }

    #[test]
    fn test_exclusion_uses_id_and_category() {
        let items = vec![
            item(1, "", "", 0.0, Category::Movie),
            item(1, "", "", 0.0, Category::Show),
        ];
        let exclude = HashSet::from([ItemKey {
            id: 1,
            category: Category::Movie,
        }]);
        let selected = select(
            scored(&items, &[0.9, 0.1]),
            &exclude,
            &HashSet::new(),
            10,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].item.category, Category::Show);
    }

    #[test]
    fn test_used_keys_accumulate_across_calls() {
        let items: Vec<_> = (1..=6).map(|i| item(i, "", "", 0.0, Category::Movie)).collect();
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4];

        let used = UsedKeys::new();
        let (used, first) = used.select(scored(&items, &scores), &HashSet::new(), 2);
        let (used, second) = used.select(scored(&items, &scores), &HashSet::new(), 2);

        assert_eq!(ids(&first), vec![1, 2]);
        assert_eq!(ids(&second), vec![3, 4]);
        assert_eq!(used.len(), 4);
        assert!(used.contains(&items[0].key()));
        assert!(!used.contains(&items[5].key()));
    }

    #[test]
    fn test_empty_input() {
        let selected = select(Vec::new(), &HashSet::new(), &HashSet::new(), 5);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_into_scored_item() {
        let items = vec![item(9, "", "", 0.0, Category::Movie)];
        let candidate = ScoredCandidate {
            item: &items[0],
            score: 1.5,
            similarity: 0.5,
        };
        let output: ScoredItem = candidate.into();
        assert_eq!(output.item.id, 9);
        assert_eq!(output.score, 1.5);
        assert_eq!(output.similarity, 0.5);
    }
}
