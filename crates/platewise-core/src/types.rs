//! Core data types exchanged between the models, the aggregator and callers.

use serde::{Deserialize, Serialize};

/// A single (label, score) pair emitted by one model for one image.
///
/// Classifier endpoints are not consistent about the label key, so `class`
/// is accepted as well. A missing score counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default, alias = "class")]
    pub label: String,

    #[serde(default)]
    pub score: f32,
}

impl Prediction {
    /// Create a new prediction.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// One candidate dish in an estimation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishItem {
    /// Canonical dish name
    pub name: String,

    /// Default portion weight in grams (UI hint)
    pub default_grams: u32,

    /// Aggregated, weighted confidence rounded to 4 decimals
    pub confidence: f32,
}

/// The estimate returned for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Headline dish name; `"A or B"` when the top candidate is uncertain
    pub dish_name: String,

    /// Ranked candidates, never empty
    pub items: Vec<DishItem>,

    /// Opaque identifier, unique per call
    pub preview_image_id: String,
}

/// Generate a fresh preview id (`img_` followed by 10 hex characters).
pub fn new_preview_image_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("img_{}", &hex[..10])
}
