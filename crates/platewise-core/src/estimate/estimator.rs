//! Turns one image into an [`EstimationResult`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Config, ScoringConfig};
use crate::error::EstimateError;
use crate::models::{ImageInput, ModelSet};
use crate::pipeline::{DecodedImage, ImageDecoder, Validator};
use crate::types::{new_preview_image_id, EstimationResult};
use crate::vocabulary::CANDIDATES;

use super::scoreboard::{fallback_item, headline, LabelSource, ScoreBoard};

/// An image to estimate, given as a file path or raw bytes.
///
/// The path wins when both are present. Empty bytes count as absent.
#[derive(Debug, Clone, Default)]
pub struct EstimateInput {
    pub path: Option<PathBuf>,
    pub bytes: Option<Vec<u8>>,
}

impl EstimateInput {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            bytes: None,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            path: None,
            bytes: Some(bytes),
        }
    }
}

/// Runs every loaded model over an image and merges their votes.
pub struct Estimator {
    models: ModelSet,
    scoring: ScoringConfig,
    decoder: ImageDecoder,
    validator: Validator,
}

impl Estimator {
    /// Build HTTP-backed models from configuration.
    ///
    /// Fails with [`EstimateError::ModelUnavailable`] when no model is reachable.
    pub async fn load(config: &Config) -> Result<Self, EstimateError> {
        let models = ModelSet::load(config).await;
        Self::from_models(models, config)
    }

    /// Wrap an already built model set.
    pub fn from_models(models: ModelSet, config: &Config) -> Result<Self, EstimateError> {
        if models.is_empty() {
            return Err(EstimateError::ModelUnavailable);
        }
        tracing::debug!("Estimator ready with {:?}", models.model_ids());
        Ok(Self {
            models,
            scoring: config.scoring.clone(),
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
        })
    }

    /// Identifiers of the models this estimator calls.
    pub fn model_ids(&self) -> Vec<String> {
        self.models.model_ids()
    }

    /// Validate and decode an input, then estimate it.
    pub async fn estimate_input(
        &self,
        input: EstimateInput,
    ) -> Result<EstimationResult, EstimateError> {
        let bytes = input.bytes.filter(|b| !b.is_empty());
        let decoded = match (input.path, bytes) {
            (Some(path), _) => {
                self.validator.validate_file(&path)?;
                self.decoder.decode_file(&path).await?
            }
            (None, Some(bytes)) => {
                self.validator.check_size(bytes.len())?;
                self.decoder.decode_from_bytes(bytes, Path::new("upload")).await?
            }
            (None, None) => return Err(EstimateError::NoInput),
        };
        tracing::debug!(
            "Decoded {:?} image {}x{} ({} bytes)",
            decoded.format,
            decoded.width,
            decoded.height,
            decoded.byte_len
        );
        Ok(self.estimate(&decoded).await)
    }

    /// Estimate a decoded image. Model failures only shrink the result.
    pub async fn estimate(&self, image: &DecodedImage) -> EstimationResult {
        let start = Instant::now();

        let input = match ImageInput::from_image(&image.image) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("{e}");
                return EstimationResult {
                    dish_name: fallback_item().name,
                    items: vec![fallback_item()],
                    preview_image_id: new_preview_image_id(),
                };
            }
        };

        let mut board = ScoreBoard::new();

        for (position, classifier) in self.models.classifiers().iter().enumerate() {
            let model_start = Instant::now();
            match classifier.classify(&input, self.scoring.top_k).await {
                Ok(predictions) => {
                    tracing::trace!(
                        "  {}: {} predictions in {:?}",
                        classifier.model_id(),
                        predictions.len(),
                        model_start.elapsed()
                    );
                    let weight = self.scoring.weights.for_classifier(position);
                    board.merge(&predictions, weight, LabelSource::Classifier);
                }
                Err(e) => tracing::warn!("{e}"),
            }
        }

        if let Some(zero_shot) = self.models.zero_shot() {
            let model_start = Instant::now();
            match zero_shot
                .classify_against(&input, CANDIDATES, self.scoring.zero_shot_top_k)
                .await
            {
                Ok(predictions) => {
                    tracing::trace!(
                        "  {}: {} predictions in {:?}",
                        zero_shot.model_id(),
                        predictions.len(),
                        model_start.elapsed()
                    );
                    board.merge(
                        &predictions,
                        self.scoring.weights.zero_shot,
                        LabelSource::Canonical,
                    );
                }
                Err(e) => tracing::warn!("{e}"),
            }
        }

        let items = board.ranked(self.scoring.max_items);
        let dish_name = headline(&items, self.scoring.confidence_threshold);
        tracing::debug!("Estimated {dish_name:?} in {:?}", start.elapsed());

        EstimationResult {
            dish_name,
            items,
            preview_image_id: new_preview_image_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scripted::{FailingClassifier, ScriptedClassifier, ScriptedZeroShot};
    use image::DynamicImage;
    use std::io::Cursor;
    use std::sync::atomic::Ordering;

    fn image() -> DecodedImage {
        DecodedImage::from_image(DynamicImage::new_rgb8(8, 8))
    }

    fn png_bytes() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn estimator(models: ModelSet) -> Estimator {
        Estimator::from_models(models, &Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_single_classifier_is_weighted() {
        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Oatmeal", 0.9)])),
        );
        let result = est.estimate(&image()).await;
        assert_eq!(result.dish_name, "Oatmeal");
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Oatmeal");
        assert_eq!(result.items[0].default_grams, 100);
        assert!((result.items[0].confidence - 0.54).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_low_confidence_headline_names_two_dishes() {
        let est = estimator(ModelSet::new().with_classifier(ScriptedClassifier::new(
            "general",
            &[("Biryani", 0.50), ("Chicken Curry", 0.40)],
        )));
        let result = est.estimate(&image()).await;
        assert_eq!(result.dish_name, "Biryani or Chicken Curry");
    }

    #[tokio::test]
    async fn test_duplicate_predictions_do_not_change_score() {
        let once = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.5)])),
        );
        let twice = estimator(ModelSet::new().with_classifier(ScriptedClassifier::new(
            "general",
            &[("Dosa", 0.5), ("Dosa", 0.5)],
        )));
        let a = once.estimate(&image()).await;
        let b = twice.estimate(&image()).await;
        assert_eq!(a.items, b.items);
    }

    #[tokio::test]
    async fn test_all_models_failing_yields_meal() {
        let est = estimator(
            ModelSet::new()
                .with_classifier(FailingClassifier::new("general"))
                .with_classifier(FailingClassifier::new("regional"))
                .with_zero_shot(ScriptedZeroShot::failing("clip")),
        );
        let result = est.estimate(&image()).await;
        assert_eq!(result.dish_name, "Meal");
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].default_grams, 100);
        assert_eq!(result.items[0].confidence, 0.0);
    }

    #[tokio::test]
    async fn test_failing_model_is_skipped() {
        let est = estimator(
            ModelSet::new()
                .with_classifier(FailingClassifier::new("general"))
                .with_classifier(ScriptedClassifier::new("regional", &[("Idli", 0.5)])),
        );
        let result = est.estimate(&image()).await;
        assert_eq!(result.items[0].name, "Idli");
        assert!((result.items[0].confidence - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_results_never_exceed_max_items() {
        let est = estimator(ModelSet::new().with_classifier(ScriptedClassifier::new(
            "general",
            &[
                ("Dosa", 0.9),
                ("Idli", 0.8),
                ("Vada", 0.7),
                ("Upma", 0.6),
                ("Poha", 0.5),
            ],
        )));
        let result = est.estimate(&image()).await;
        assert_eq!(result.items.len(), 4);
        assert!(result.items.len() <= Config::default().scoring.max_items);
    }

    #[tokio::test]
    async fn test_zero_shot_outweighs_classifier_and_is_not_renormalized() {
        let est = estimator(
            ModelSet::new()
                .with_classifier(ScriptedClassifier::new("general", &[("oats", 0.9)]))
                .with_zero_shot(ScriptedZeroShot::new("clip", &[("Porridge", 0.6)])),
        );
        let result = est.estimate(&image()).await;
        // 0.6 * 1.1 = 0.66 beats 0.9 * 0.6 = 0.54
        assert_eq!(result.items[0].name, "Porridge");
        assert_eq!(result.items[1].name, "Oatmeal");
        assert_eq!(result.dish_name, "Porridge");
    }

    #[tokio::test]
    async fn test_zero_shot_only_estimator() {
        let est = estimator(
            ModelSet::new().with_zero_shot(ScriptedZeroShot::new("clip", &[("Masala Dosa", 0.8)])),
        );
        let result = est.estimate(&image()).await;
        assert_eq!(result.dish_name, "Masala Dosa");
        assert_eq!(result.items[0].default_grams, 140);
    }

    #[tokio::test]
    async fn test_weights_follow_loaded_position() {
        let mut config = Config::default();
        config.scoring.weights.general = 1.0;
        config.scoring.weights.regional = 0.5;
        let est = Estimator::from_models(
            ModelSet::new()
                .with_classifier(ScriptedClassifier::new("first", &[("Dosa", 0.4)]))
                .with_classifier(ScriptedClassifier::new("second", &[("Idli", 0.6)])),
            &config,
        )
        .unwrap();
        let result = est.estimate(&image()).await;
        assert_eq!(result.items[0].name, "Dosa");
        assert!((result.items[1].confidence - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_preview_ids_are_unique() {
        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.9)])),
        );
        let a = est.estimate(&image()).await;
        let b = est.estimate(&image()).await;
        assert_ne!(a.preview_image_id, b.preview_image_id);
        assert!(a.preview_image_id.starts_with("img_"));
    }

    #[test]
    fn test_empty_model_set_is_unavailable() {
        let err = Estimator::from_models(ModelSet::new(), &Config::default()).err();
        assert!(matches!(err, Some(EstimateError::ModelUnavailable)));
    }

    #[tokio::test]
    async fn test_no_input_rejected_before_models_run() {
        let classifier = ScriptedClassifier::new("general", &[("Dosa", 0.9)]);
        let calls = classifier.call_counter();
        let est = estimator(ModelSet::new().with_classifier(classifier));

        let err = est.estimate_input(EstimateInput::default()).await.err();
        assert!(matches!(err, Some(EstimateError::NoInput)));

        let err = est
            .estimate_input(EstimateInput::from_bytes(vec![]))
            .await
            .err();
        assert!(matches!(err, Some(EstimateError::NoInput)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_estimate_input_from_bytes() {
        let classifier = ScriptedClassifier::new("general", &[("Dosa", 0.9)]);
        let calls = classifier.call_counter();
        let est = estimator(ModelSet::new().with_classifier(classifier));

        let result = est
            .estimate_input(EstimateInput::from_bytes(png_bytes()))
            .await
            .unwrap();
        assert_eq!(result.dish_name, "Dosa");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_estimate_input_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.9)])),
        );
        let result = est
            .estimate_input(EstimateInput::from_path(&path))
            .await
            .unwrap();
        assert_eq!(result.dish_name, "Dosa");
    }

    #[tokio::test]
    async fn test_path_used_when_bytes_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.9)])),
        );
        let input = EstimateInput {
            path: Some(path),
            bytes: Some(vec![]),
        };
        let result = est.estimate_input(input).await.unwrap();
        assert_eq!(result.dish_name, "Dosa");
    }

    #[tokio::test]
    async fn test_path_preferred_over_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.9)])),
        );
        let input = EstimateInput {
            path: Some(path),
            bytes: Some(b"not an image".to_vec()),
        };
        assert!(est.estimate_input(input).await.is_ok());
    }

    #[tokio::test]
    async fn test_estimate_input_missing_file() {
        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.9)])),
        );
        let err = est
            .estimate_input(EstimateInput::from_path("/nonexistent/plate.png"))
            .await
            .err();
        assert!(matches!(err, Some(EstimateError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_estimate_input_garbage_bytes_fail_to_decode() {
        let est = estimator(
            ModelSet::new().with_classifier(ScriptedClassifier::new("general", &[("Dosa", 0.9)])),
        );
        let err = est
            .estimate_input(EstimateInput::from_bytes(b"not an image".to_vec()))
            .await
            .err();
        assert!(matches!(
            err,
            Some(EstimateError::Decode { .. } | EstimateError::UnsupportedFormat { .. })
        ));
    }
}
