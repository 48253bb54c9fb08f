//! Environment variable overrides.
//!
//! Deployments configure the service through plain environment variables
//! (`HF_MODEL_GENERAL`, `CONF_THRES`, ...). They are applied on top of the
//! file configuration. Setting a model variable to an empty string disables
//! that model.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        self.apply_env_with(&env)
    }

    /// Apply overrides from a provided map (useful for testing).
    pub fn apply_env_with(&mut self, env: &HashMap<String, String>) -> Result<(), ConfigError> {
        let get = |key: &str| env.get(key).map(|v| v.trim().to_string());

        // Models
        if let Some(token) = get("HF_TOKEN") {
            self.models.api_token = token;
        }
        if let Some(id) = get("HF_MODEL_GENERAL") {
            self.models.general = Some(id).filter(|id| !id.is_empty());
        }
        if let Some(id) = get("HF_MODEL_INDIAN") {
            self.models.regional = Some(id).filter(|id| !id.is_empty());
        }
        if let Some(id) = get("HF_MODEL_ZS") {
            self.models.zero_shot = Some(id).filter(|id| !id.is_empty());
        }

        // Scoring
        override_parsed(env, "FOOD_TOP_K", &mut self.scoring.top_k)?;
        override_parsed(env, "ZS_TOP_K", &mut self.scoring.zero_shot_top_k)?;
        override_parsed(env, "CONF_THRES", &mut self.scoring.confidence_threshold)?;
        override_parsed(env, "W_GENERAL", &mut self.scoring.weights.general)?;
        override_parsed(env, "W_INDIAN", &mut self.scoring.weights.regional)?;
        override_parsed(env, "W_CLIP", &mut self.scoring.weights.zero_shot)?;
        override_parsed(env, "MAX_ITEMS", &mut self.scoring.max_items)?;

        // Limits
        override_parsed(env, "AI_MAX_MB", &mut self.limits.max_upload_mb)?;
        if let Some(value) = get("ALLOW_WEBP") {
            self.limits.allow_webp = is_truthy(&value);
        }

        // Server
        if let Some(token) = get("AI_SHARED_TOKEN") {
            self.server.api_token = token;
        }
        override_parsed(env, "PORT", &mut self.server.port)?;
        if let Some(origins) = get("CORS_ORIGINS") {
            self.server.cors_origins = origins;
        }
        if let Some(value) = get("AI_PRELOAD") {
            self.server.preload = is_truthy(&value);
        }

        Ok(())
    }
}

fn override_parsed<T: FromStr>(
    env: &HashMap<String, String>,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    let Some(raw) = env.get(key) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{key}={raw:?} is not a valid value"))
    })?;
    Ok(())
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}
