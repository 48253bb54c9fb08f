//! Per-request score table with the max-merge rule.

use std::collections::HashMap;

use crate::types::{DishItem, Prediction};
use crate::vocabulary::{default_grams, normalize_label, FALLBACK_DISH, FALLBACK_GRAMS};

/// How a model's labels are mapped before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Free-form classifier labels, run through the normalizer.
    Classifier,
    /// Zero-shot labels, already canonical.
    Canonical,
}

/// Accumulates weighted scores per dish name for one image.
///
/// Keeps first-insertion order so that ties rank stably.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    entries: Vec<(String, f32)>,
    index: HashMap<String, usize>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `weighted` for `name`, keeping the larger of old and new.
    pub fn record(&mut self, name: &str, weighted: f32) {
        match self.index.get(name) {
            Some(&slot) => {
                let current = &mut self.entries[slot].1;
                *current = current.max(weighted);
            }
            None => {
                // Names start at zero, so a negative score never lowers one.
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), weighted.max(0.0)));
            }
        }
    }

    /// Merge one model's predictions, scaled by `weight`.
    ///
    /// Predictions without a usable name are skipped.
    pub fn merge(&mut self, predictions: &[Prediction], weight: f32, source: LabelSource) {
        for prediction in predictions {
            let name = match source {
                LabelSource::Classifier => normalize_label(&prediction.label),
                LabelSource::Canonical => prediction.label.trim().to_string(),
            };
            if name.is_empty() {
                continue;
            }
            self.record(&name, prediction.score * weight);
        }
    }

    /// Current score for `name`, if recorded.
    #[cfg(test)]
    fn score(&self, name: &str) -> Option<f32> {
        self.index.get(name).map(|&slot| self.entries[slot].1)
    }

    /// Top `max_items` dishes, best first, with portion defaults.
    ///
    /// Never empty: an empty board yields the single fallback item.
    pub fn ranked(&self, max_items: usize) -> Vec<DishItem> {
        let mut ordered: Vec<&(String, f32)> = self.entries.iter().collect();
        // sort_by is stable, so equal scores keep insertion order
        ordered.sort_by(|a, b| b.1.total_cmp(&a.1));

        let items: Vec<DishItem> = ordered
            .into_iter()
            .take(max_items.max(1))
            .map(|(name, score)| DishItem {
                name: name.clone(),
                default_grams: default_grams(name),
                confidence: round4(*score),
            })
            .collect();

        if items.is_empty() {
            return vec![fallback_item()];
        }
        items
    }
}

/// Headline for a ranked list: the top name, or `"A or B"` when the top
/// confidence is below `threshold` and a runner-up exists.
pub fn headline(items: &[DishItem], threshold: f32) -> String {
    match items {
        [] => FALLBACK_DISH.to_string(),
        [first, second, ..] if first.confidence < threshold => {
            format!("{} or {}", first.name, second.name)
        }
        [first, ..] => first.name.clone(),
    }
}

/// The single item reported when no model produced a usable label.
pub fn fallback_item() -> DishItem {
    DishItem {
        name: FALLBACK_DISH.to_string(),
        default_grams: FALLBACK_GRAMS,
        confidence: 0.0,
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, confidence: f32) -> DishItem {
        DishItem {
            name: name.to_string(),
            default_grams: default_grams(name),
            confidence,
        }
    }

    #[test]
    fn test_record_keeps_maximum() {
        let mut board = ScoreBoard::new();
        board.record("Dosa", 0.3);
        board.record("Dosa", 0.5);
        board.record("Dosa", 0.4);
        assert_eq!(board.score("Dosa"), Some(0.5));
        assert_eq!(board.ranked(4).len(), 1);
    }

    #[test]
    fn test_duplicate_predictions_do_not_accumulate() {
        let preds = vec![Prediction::new("Dosa", 0.5), Prediction::new("Dosa", 0.5)];
        let mut board = ScoreBoard::new();
        board.merge(&preds, 1.0, LabelSource::Classifier);
        assert_eq!(board.score("Dosa"), Some(0.5));
    }

    #[test]
    fn test_merge_normalizes_classifier_labels() {
        let preds = vec![
            Prediction::new("chicken_fried_rice", 0.5),
            Prediction::new("  OATS ", 0.4),
        ];
        let mut board = ScoreBoard::new();
        board.merge(&preds, 1.0, LabelSource::Classifier);
        assert_eq!(board.score("Chicken & Rice"), Some(0.5));
        assert_eq!(board.score("Oatmeal"), Some(0.4));
    }

    #[test]
    fn test_merge_keeps_canonical_labels_verbatim() {
        let preds = vec![Prediction::new("Porridge", 0.5)];
        let mut board = ScoreBoard::new();
        board.merge(&preds, 1.0, LabelSource::Canonical);
        assert_eq!(board.score("Porridge"), Some(0.5));
        assert_eq!(board.score("Oatmeal"), None);
    }

    #[test]
    fn test_merge_skips_empty_labels() {
        let preds = vec![Prediction::new("   ", 0.9), Prediction::new("", 0.9)];
        let mut board = ScoreBoard::new();
        board.merge(&preds, 1.0, LabelSource::Classifier);
        board.merge(&preds, 1.0, LabelSource::Canonical);
        assert_eq!(board.ranked(4), vec![fallback_item()]);
    }

    #[test]
    fn test_ranked_sorts_and_caps() {
        let mut board = ScoreBoard::new();
        for (name, score) in [("A", 0.1), ("B", 0.4), ("C", 0.3), ("D", 0.2), ("E", 0.5)] {
            board.record(name, score);
        }
        let ranked = board.ranked(3);
        let names: Vec<&str> = ranked.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["E", "B", "C"]);
    }

    #[test]
    fn test_ranked_ties_keep_insertion_order() {
        let mut board = ScoreBoard::new();
        board.record("Second", 0.3);
        board.record("First", 0.5);
        board.record("Third", 0.3);
        let names: Vec<String> = board.ranked(4).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_ranked_rounds_and_attaches_grams() {
        let mut board = ScoreBoard::new();
        board.record("Chicken Curry", 0.123_456);
        board.record("Unlisted Dish", 0.1);
        let ranked = board.ranked(4);
        assert_eq!(ranked[0].confidence, 0.1235);
        assert_eq!(ranked[0].default_grams, 220);
        assert_eq!(ranked[1].default_grams, FALLBACK_GRAMS);
    }

    #[test]
    fn test_empty_board_yields_fallback() {
        let ranked = ScoreBoard::new().ranked(4);
        assert_eq!(ranked, vec![fallback_item()]);
        assert_eq!(ranked[0].name, "Meal");
        assert_eq!(ranked[0].default_grams, 100);
        assert_eq!(ranked[0].confidence, 0.0);
    }

    #[test]
    fn test_headline_confident() {
        let items = vec![item("Dosa", 0.8), item("Idli", 0.1)];
        assert_eq!(headline(&items, 0.55), "Dosa");
    }

    #[test]
    fn test_headline_uncertain_pairs_top_two() {
        let items = vec![item("Biryani", 0.5), item("Chicken Curry", 0.4)];
        assert_eq!(headline(&items, 0.55), "Biryani or Chicken Curry");
    }

    #[test]
    fn test_headline_uncertain_single_item() {
        let items = vec![item("Oatmeal", 0.2)];
        assert_eq!(headline(&items, 0.55), "Oatmeal");
    }

    #[test]
    fn test_headline_at_threshold_is_confident() {
        let items = vec![item("Dosa", 0.55), item("Idli", 0.5)];
        assert_eq!(headline(&items, 0.55), "Dosa");
    }
}
