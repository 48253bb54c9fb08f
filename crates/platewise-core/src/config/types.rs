//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Which models to call and where they live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Base URL of a Hugging Face Inference API compatible endpoint
    pub endpoint: String,

    /// Bearer token for the endpoint (supports ${ENV_VAR} syntax)
    pub api_token: String,

    /// General food classifier (first slot)
    pub general: Option<String>,

    /// Regional / specialized classifier (second slot)
    pub regional: Option<String>,

    /// Any further classifiers, scored with the default weight
    pub additional: Vec<String>,

    /// Zero-shot re-ranking model
    pub zero_shot: Option<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            api_token: "${HF_TOKEN}".to_string(),
            general: Some("Jacques7103/Food-Recognition".to_string()),
            regional: Some("Utsav201247/food_recognition".to_string()),
            additional: vec![],
            zero_shot: Some("openai/clip-vit-base-patch32".to_string()),
        }
    }
}

impl ModelsConfig {
    /// Configured classifier ids in slot order. Empty ids are skipped.
    pub fn classifier_ids(&self) -> Vec<&str> {
        self.general
            .iter()
            .chain(self.regional.iter())
            .chain(self.additional.iter())
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Configured zero-shot model id, if any.
    pub fn zero_shot_id(&self) -> Option<&str> {
        self.zero_shot
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Predictions requested from each classifier
    pub top_k: usize,

    /// Predictions kept from the zero-shot model
    pub zero_shot_top_k: usize,

    /// Below this top confidence the headline becomes "A or B"
    pub confidence_threshold: f32,

    /// Maximum number of items in a result
    pub max_items: usize,

    /// Per-model weights
    pub weights: WeightsConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            zero_shot_top_k: 5,
            confidence_threshold: 0.55,
            max_items: 4,
            weights: WeightsConfig::default(),
        }
    }
}

/// Multipliers applied to raw model scores before merging.
///
/// Scores are not normalized across models, so these only make sense
/// relative to each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// First loaded classifier
    pub general: f32,

    /// Second loaded classifier
    pub regional: f32,

    /// Every classifier after the second
    pub default: f32,

    /// Zero-shot model
    pub zero_shot: f32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            general: 0.6,
            regional: 0.6,
            default: 0.6,
            zero_shot: 1.1,
        }
    }
}

impl WeightsConfig {
    /// Weight for the classifier at `position` among the loaded classifiers.
    pub fn for_classifier(&self, position: usize) -> f32 {
        match position {
            0 => self.general,
            1 => self.regional,
            _ => self.default,
        }
    }
}

/// Limits protecting the service from problematic inputs and slow models.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted image size in megabytes
    pub max_upload_mb: f64,

    /// Accept `image/webp` uploads
    pub allow_webp: bool,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Per model call timeout in milliseconds
    pub model_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 8.0,
            allow_webp: true,
            decode_timeout_ms: 5000,
            model_timeout_ms: 30000,
        }
    }
}

impl LimitsConfig {
    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb * 1024.0 * 1024.0) as usize
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Shared token expected in the `x-api-token` header (supports ${ENV_VAR} syntax)
    pub api_token: String,

    /// Comma-separated allowed CORS origins, `*` for any
    pub cors_origins: String,

    /// Build the estimator at startup instead of on the first request
    pub preload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8100,
            api_token: "${AI_SHARED_TOKEN}".to_string(),
            cors_origins: "*".to_string(),
            preload: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Plain values pass through; empty values and unset variables yield `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
