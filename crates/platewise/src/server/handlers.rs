//! Route handlers and the token extractor.

use std::net::SocketAddr;
use std::time::Instant;

use axum::async_trait;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{ConnectInfo, FromRequestParts, Multipart, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use platewise_core::{EstimateInput, EstimationResult};
use serde::Serialize;

use super::error::ApiError;
use super::AppState;

/// Header carrying the shared secret.
pub const TOKEN_HEADER: &str = "x-api-token";

/// Multipart field holding the image.
pub const IMAGE_FIELD: &str = "image";

/// Liveness payload. Answers even before any model has loaded.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub model_loaded: bool,
    pub preload: bool,
    pub max_mb: f64,
    pub allow_webp: bool,
    pub models: Vec<String>,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

/// Request details attached to every successful estimate.
#[derive(Debug, Serialize)]
pub struct RequestMeta {
    pub latency_ms: u64,
    pub model_loaded: bool,
    pub client_ip: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: usize,
}

/// An estimate plus request metadata. The estimate fields stay top-level.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub result: EstimationResult,
    pub meta: RequestMeta,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let limits = &state.config.limits;
    Json(HealthResponse {
        ok: true,
        model_loaded: state.estimator.is_loaded(),
        preload: state.config.server.preload,
        max_mb: limits.max_upload_mb,
        allow_webp: limits.allow_webp,
        models: state
            .estimator
            .loaded()
            .map(|e| e.model_ids())
            .unwrap_or_default(),
        version: platewise_core::VERSION,
    })
}

pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: state.estimator.is_loaded(),
    })
}

/// Proof that the request carried the configured shared token.
pub struct RequireToken;

#[async_trait]
impl FromRequestParts<AppState> for RequireToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let Some(expected) = state.api_token.as_deref() else {
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "API token not set",
            ));
        };

        let provided = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!("Rejected request with missing or invalid token");
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid token"));
        }
        Ok(RequireToken)
    }
}

/// `POST /estimate`: multipart upload in, estimate out.
pub async fn estimate(
    State(state): State<AppState>,
    client: Option<ConnectInfo<SocketAddr>>,
    _token: RequireToken,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let mut multipart = multipart
        .map_err(|e| ApiError::bad_request(format!("Failed to read image: {}", e.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !state
            .validator
            .is_allowed_content_type(content_type.as_deref())
        {
            return Err(ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Only {} supported", state.validator.allowed_formats()),
            ));
        }

        let raw = field.bytes().await.map_err(ApiError::from_multipart)?;
        state.validator.check_size(raw.len())?;

        let client_ip = client.map(|ConnectInfo(addr)| addr.ip().to_string());
        return run_estimate(&state, raw.to_vec(), content_type, client_ip).await;
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field '{IMAGE_FIELD}'"
    )))
}

async fn run_estimate(
    state: &AppState,
    raw: Vec<u8>,
    content_type: Option<String>,
    client_ip: Option<String>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let start = Instant::now();
    let size_bytes = raw.len();

    let estimator = state.estimator.get().await.map_err(|e| {
        tracing::error!("estimation error: {e}");
        ApiError::from(e)
    })?;
    let result = estimator
        .estimate_input(EstimateInput::from_bytes(raw))
        .await
        .map_err(|e| {
            tracing::warn!("estimation error: {e}");
            ApiError::from(e)
        })?;

    let latency_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        dish = %result.dish_name,
        latency_ms,
        size_bytes,
        "Estimated upload"
    );

    Ok(Json(EstimateResponse {
        result,
        meta: RequestMeta {
            latency_ms,
            model_loaded: true,
            client_ip,
            content_type,
            size_bytes,
        },
    }))
}
