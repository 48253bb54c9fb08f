//! In-memory models returning canned predictions.
//!
//! Used by tests and for wiring the service without network access.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::provider::{top_k_predictions, ImageClassifier, ImageInput, ZeroShotClassifier};
use crate::error::EstimateError;
use crate::types::Prediction;

/// Classifier that always answers with the same predictions.
pub struct ScriptedClassifier {
    model_id: String,
    predictions: Vec<Prediction>,
    available: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedClassifier {
    pub fn new(model_id: &str, predictions: &[(&str, f32)]) -> Self {
        Self {
            model_id: model_id.to_string(),
            predictions: predictions
                .iter()
                .map(|(label, score)| Prediction::new(*label, *score))
                .collect(),
            available: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report the model as unreachable when the model set is built.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Shared count of `classify` calls, readable after the model moves
    /// into a set.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ImageClassifier for ScriptedClassifier {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn classify(
        &self,
        _image: &ImageInput,
        top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(top_k_predictions(self.predictions.clone(), top_k))
    }
}

/// Classifier whose every call fails.
pub struct FailingClassifier {
    model_id: String,
}

impl FailingClassifier {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
        }
    }
}

#[async_trait]
impl ImageClassifier for FailingClassifier {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn classify(
        &self,
        _image: &ImageInput,
        _top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError> {
        Err(EstimateError::ModelInvocation {
            model: self.model_id.clone(),
            message: "HTTP 503 Service Unavailable: model is loading".to_string(),
            status_code: Some(503),
        })
    }
}

/// Zero-shot model with fixed per-label scores.
///
/// Labels not offered as candidates are dropped, mirroring a real
/// zero-shot model which can only answer with what it was asked.
pub struct ScriptedZeroShot {
    model_id: String,
    scores: Vec<Prediction>,
    fail: bool,
}

impl ScriptedZeroShot {
    pub fn new(model_id: &str, scores: &[(&str, f32)]) -> Self {
        Self {
            model_id: model_id.to_string(),
            scores: scores
                .iter()
                .map(|(label, score)| Prediction::new(*label, *score))
                .collect(),
            fail: false,
        }
    }

    /// Make every call fail.
    pub fn failing(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            scores: vec![],
            fail: true,
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for ScriptedZeroShot {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn classify_against(
        &self,
        _image: &ImageInput,
        candidate_labels: &[&str],
        top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError> {
        if self.fail {
            return Err(EstimateError::ModelInvocation {
                model: self.model_id.clone(),
                message: "request failed: connection refused".to_string(),
                status_code: None,
            });
        }
        let offered: Vec<Prediction> = self
            .scores
            .iter()
            .filter(|p| candidate_labels.contains(&p.label.as_str()))
            .cloned()
            .collect();
        Ok(top_k_predictions(offered, top_k))
    }
}
