//! Hugging Face Inference API clients.
//!
//! Both tasks post a JSON body with the base64 image. Classification asks
//! for `top_k` labels; zero-shot classification passes the candidate labels.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::provider::{top_k_predictions, ImageClassifier, ImageInput, ZeroShotClassifier};
use crate::error::EstimateError;
use crate::types::Prediction;

/// Connection settings shared by every model on one endpoint.
#[derive(Clone)]
pub struct HfEndpoint {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HfEndpoint {
    /// Create an endpoint whose requests time out after `timeout`.
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.base_url, model_id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn probe(&self, model_id: &str) -> bool {
        let request = self.authorize(self.client.get(self.model_url(model_id)));
        match request.send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!("Probe of {model_id} returned HTTP {}", resp.status());
                false
            }
            Err(e) => {
                tracing::debug!("Probe of {model_id} failed: {e}");
                false
            }
        }
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        model_id: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, EstimateError> {
        let start = Instant::now();
        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| EstimateError::ModelInvocation {
                model: model_id.to_string(),
                message: format!("request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EstimateError::ModelInvocation {
                model: model_id.to_string(),
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed = resp.json().await.map_err(|e| EstimateError::ModelInvocation {
            model: model_id.to_string(),
            message: format!("failed to parse response: {e}"),
            status_code: None,
        })?;
        tracing::trace!("  {model_id}: {:?}", start.elapsed());
        Ok(parsed)
    }
}

#[derive(Serialize)]
struct ClassifyRequest {
    inputs: String,
    parameters: ClassifyParameters,
}

#[derive(Serialize)]
struct ClassifyParameters {
    top_k: usize,
}

/// Image classifier served by the Inference API.
pub struct HfClassifier {
    endpoint: HfEndpoint,
    model_id: String,
}

impl HfClassifier {
    pub fn new(endpoint: HfEndpoint, model_id: &str) -> Self {
        Self {
            endpoint,
            model_id: model_id.to_string(),
        }
    }
}

#[async_trait]
impl ImageClassifier for HfClassifier {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.endpoint.probe(&self.model_id).await
    }

    async fn classify(
        &self,
        image: &ImageInput,
        top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError> {
        let body = ClassifyRequest {
            inputs: image.base64(),
            parameters: ClassifyParameters { top_k },
        };
        let request = self
            .endpoint
            .client
            .post(self.endpoint.model_url(&self.model_id))
            .json(&body);
        let predictions: Vec<Prediction> =
            self.endpoint.send_json(&self.model_id, request).await?;
        Ok(top_k_predictions(predictions, top_k))
    }
}

// --- Zero-shot request/response types ---

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: String,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// Endpoints answer with a list, a single object, or parallel label/score
/// columns depending on the backend version.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Many(Vec<Prediction>),
    Columns { labels: Vec<String>, scores: Vec<f32> },
    One(Prediction),
}

impl ZeroShotResponse {
    fn into_predictions(self) -> Vec<Prediction> {
        match self {
            Self::Many(predictions) => predictions,
            Self::Columns { labels, scores } => labels
                .into_iter()
                .zip(scores)
                .map(|(label, score)| Prediction { label, score })
                .collect(),
            Self::One(prediction) => vec![prediction],
        }
    }
}

/// Zero-shot image classifier (CLIP / SigLIP) served by the Inference API.
pub struct HfZeroShot {
    endpoint: HfEndpoint,
    model_id: String,
}

impl HfZeroShot {
    pub fn new(endpoint: HfEndpoint, model_id: &str) -> Self {
        Self {
            endpoint,
            model_id: model_id.to_string(),
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for HfZeroShot {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.endpoint.probe(&self.model_id).await
    }

    async fn classify_against(
        &self,
        image: &ImageInput,
        candidate_labels: &[&str],
        top_k: usize,
    ) -> Result<Vec<Prediction>, EstimateError> {
        let body = ZeroShotRequest {
            inputs: image.base64(),
            parameters: ZeroShotParameters { candidate_labels },
        };
        let request = self
            .endpoint
            .client
            .post(self.endpoint.model_url(&self.model_id))
            .json(&body);
        let response: ZeroShotResponse = self.endpoint.send_json(&self.model_id, request).await?;
        Ok(top_k_predictions(response.into_predictions(), top_k))
    }
}
