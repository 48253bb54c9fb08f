//! Vision model clients.
//!
//! Models are opaque: a classifier returns (label, score) pairs from its own
//! label set, a zero-shot model scores the image against labels we supply.
//! The concrete backend is a Hugging Face Inference API compatible endpoint;
//! scripted in-memory models stand in for it in tests.

pub mod huggingface;
pub mod provider;
pub mod scripted;

use std::time::Duration;

use crate::config::{resolve_env_var, Config};

pub use huggingface::{HfClassifier, HfEndpoint, HfZeroShot};
pub use provider::{ImageClassifier, ImageInput, ZeroShotClassifier};

/// The models an estimator calls, in call order.
#[derive(Default)]
pub struct ModelSet {
    classifiers: Vec<Box<dyn ImageClassifier>>,
    zero_shot: Option<Box<dyn ZeroShotClassifier>>,
}

impl ModelSet {
    /// Empty set; add models with the `with_*` builders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a classifier. Its weight follows from its position.
    pub fn with_classifier(mut self, classifier: impl ImageClassifier + 'static) -> Self {
        self.classifiers.push(Box::new(classifier));
        self
    }

    /// Set the zero-shot model.
    pub fn with_zero_shot(mut self, model: impl ZeroShotClassifier + 'static) -> Self {
        self.zero_shot = Some(Box::new(model));
        self
    }

    /// Build HTTP clients for every configured model and keep the reachable ones.
    pub async fn load(config: &Config) -> Self {
        let endpoint = HfEndpoint::new(
            &config.models.endpoint,
            resolve_env_var(&config.models.api_token),
            Duration::from_millis(config.limits.model_timeout_ms),
        );

        let mut candidates = Self::new();
        for id in config.models.classifier_ids() {
            candidates = candidates.with_classifier(HfClassifier::new(endpoint.clone(), id));
        }
        if let Some(id) = config.models.zero_shot_id() {
            candidates = candidates.with_zero_shot(HfZeroShot::new(endpoint.clone(), id));
        }
        candidates.retain_available().await
    }

    /// Drop models that report themselves unreachable.
    ///
    /// The first classifier is the required one; the rest are optional.
    /// Either way a failure is only logged here. Whether anything is left
    /// to serve with is the estimator's call.
    pub async fn retain_available(self) -> Self {
        let mut classifiers = Vec::with_capacity(self.classifiers.len());
        for (position, classifier) in self.classifiers.into_iter().enumerate() {
            let kind = if position == 0 { "Required" } else { "Optional" };
            if classifier.is_available().await {
                tracing::info!("Loaded classifier {}", classifier.model_id());
                classifiers.push(classifier);
            } else {
                tracing::warn!("{kind} model load failed: {}", classifier.model_id());
            }
        }

        let mut zero_shot = None;
        if let Some(model) = self.zero_shot {
            if model.is_available().await {
                tracing::info!("Loaded zero-shot {}", model.model_id());
                zero_shot = Some(model);
            } else {
                tracing::warn!("Optional zero-shot failed: {}", model.model_id());
            }
        }

        Self {
            classifiers,
            zero_shot,
        }
    }

    /// Whether no model at all is present.
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty() && self.zero_shot.is_none()
    }

    /// Identifiers of every model, classifiers first.
    pub fn model_ids(&self) -> Vec<String> {
        self.classifiers
            .iter()
            .map(|c| c.model_id().to_string())
            .chain(self.zero_shot.iter().map(|z| z.model_id().to_string()))
            .collect()
    }

    pub(crate) fn classifiers(&self) -> &[Box<dyn ImageClassifier>] {
        &self.classifiers
    }

    pub(crate) fn zero_shot(&self) -> Option<&dyn ZeroShotClassifier> {
        self.zero_shot.as_deref()
    }
}
