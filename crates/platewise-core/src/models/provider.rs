//! Model traits and the request payload shared by every backend.
//!
//! The estimator only sees these traits: a classifier returns its own
//! top-K labels, a zero-shot model scores the image against labels the
//! caller supplies.

use async_trait::async_trait;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::EstimateError;
use crate::types::Prediction;

/// An image encoded once per request, ready to send to model endpoints.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// PNG-encoded image bytes
    pub bytes: Vec<u8>,
}

impl ImageInput {
    /// Encode an RGB image as PNG.
    pub fn from_image(image: &DynamicImage) -> Result<Self, EstimateError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| EstimateError::Decode {
                path: "request".into(),
                message: format!("Cannot encode image for inference: {e}"),
            })?;
        Ok(Self {
            bytes: buffer.into_inner(),
        })
    }

    /// Base64 form used by JSON request bodies.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// A classifier with its own fixed label set.
///
/// Uses `async_trait` because we hold heterogeneous models as
/// `Box<dyn ImageClassifier>`.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Model identifier for logging and health output.
    fn model_id(&self) -> &str;

    /// Whether the model can be reached. Called once when the model set is built.
    async fn is_available(&self) -> bool;

    /// Top `top_k` predictions for the image, highest score first.
    async fn classify(
        &self,
        image: &ImageInput,
        top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError>;
}

/// A model that scores an image against caller-supplied text labels.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Model identifier for logging and health output.
    fn model_id(&self) -> &str;

    /// Whether the model can be reached. Called once when the model set is built.
    async fn is_available(&self) -> bool;

    /// Top `top_k` of `candidate_labels` for the image, highest score first.
    async fn classify_against(
        &self,
        image: &ImageInput,
        candidate_labels: &[&str],
        top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError>;
}

/// Sort predictions by descending score and keep the first `top_k`.
pub fn top_k_predictions(mut predictions: Vec<Prediction>, top_k: usize) -> Vec<Prediction> {
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    predictions.truncate(top_k);
    predictions
}
