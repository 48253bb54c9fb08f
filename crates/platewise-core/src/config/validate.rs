//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;
        if scoring.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "scoring.top_k must be > 0".into(),
            ));
        }
        if scoring.zero_shot_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "scoring.zero_shot_top_k must be > 0".into(),
            ));
        }
        if scoring.max_items == 0 {
            return Err(ConfigError::ValidationError(
                "scoring.max_items must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&scoring.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "scoring.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        let weights = [
            ("general", scoring.weights.general),
            ("regional", scoring.weights.regional),
            ("default", scoring.weights.default),
            ("zero_shot", scoring.weights.zero_shot),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "scoring.weights.{name} must be a finite value >= 0"
                )));
            }
        }

        if !self.limits.max_upload_mb.is_finite() || self.limits.max_upload_mb <= 0.0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_mb must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.model_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.model_timeout_ms must be > 0".into(),
            ));
        }
        if self.models.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "models.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}
