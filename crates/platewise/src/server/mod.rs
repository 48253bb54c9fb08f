//! HTTP service around the shared estimator.
//!
//! - `GET /health`: liveness plus model status
//! - `GET /ready`: true once the estimator is built
//! - `POST /estimate`: authenticated multipart upload

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use platewise_core::config::resolve_env_var;
use platewise_core::pipeline::Validator;
use platewise_core::{Config, SharedEstimator};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Headroom above the upload limit for multipart framing. The exact size
/// check happens in the handler so it can answer with a precise 413.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub estimator: Arc<SharedEstimator>,
    pub validator: Validator,
    /// Resolved shared token. `None` means every estimate is refused.
    pub api_token: Option<String>,
}

impl AppState {
    /// State whose estimator is built from `config` on first use.
    pub fn new(config: Config) -> Self {
        let estimator = SharedEstimator::new(config.clone());
        Self::with_estimator(config, estimator)
    }

    pub fn with_estimator(config: Config, estimator: SharedEstimator) -> Self {
        Self {
            api_token: resolve_env_var(&config.server.api_token),
            validator: Validator::new(config.limits.clone()),
            estimator: Arc::new(estimator),
            config: Arc::new(config),
        }
    }
}

/// Build the router with CORS, body limit and request tracing.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/estimate", post(handlers::estimate))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `*` (or nothing) allows any origin; otherwise a comma-separated list
/// with credentials allowed.
fn cors_layer(origins: &str) -> CorsLayer {
    let origins = origins.trim();
    if origins.is_empty() || origins == "*" {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let preload = config.server.preload;
    let state = AppState::new(config);

    if state.api_token.is_none() {
        tracing::warn!("No API token configured; /estimate will refuse every request");
    }

    if preload {
        match state.estimator.get().await {
            Ok(estimator) => tracing::info!("Models preloaded: {:?}", estimator.model_ids()),
            // Keep serving; /ready reports false until a request builds it.
            Err(e) => tracing::warn!("Preload failed: {e}"),
        }
    }

    let app = router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use platewise_core::estimate::EstimatorFactory;
    use platewise_core::models::scripted::ScriptedClassifier;
    use platewise_core::{EstimateError, Estimator, ModelSet};
    use serde_json::Value;
    use std::io::Cursor;
    use tower::ServiceExt;

    const TOKEN: &str = "test-token";
    const BOUNDARY: &str = "platewise-test-boundary";

    struct ScriptedFactory {
        fail: bool,
    }

    #[axum::async_trait]
    impl EstimatorFactory for ScriptedFactory {
        async fn build(&self) -> Result<Estimator, EstimateError> {
            if self.fail {
                return Err(EstimateError::ModelUnavailable);
            }
            let models = ModelSet::new().with_classifier(ScriptedClassifier::new(
                "general",
                &[("Biryani", 0.5), ("Chicken Curry", 0.4)],
            ));
            Estimator::from_models(models, &Config::default())
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.server.api_token = TOKEN.to_string();
        config
    }

    fn app_with(config: Config, fail: bool) -> Router {
        let estimator = SharedEstimator::with_factory(ScriptedFactory { fail });
        router(AppState::with_estimator(config, estimator))
    }

    fn app() -> Router {
        app_with(test_config(), false)
    }

    fn png_bytes() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"meal.png\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn estimate_request(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/estimate")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header("x-api-token", token);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_before_models_load() {
        let (status, body) = send(app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["model_loaded"], false);
        assert_eq!(body["max_mb"], 8.0);
        assert_eq!(body["allow_webp"], true);
        assert_eq!(body["models"], Value::Array(vec![]));
        assert_eq!(body["version"], platewise_core::VERSION);
    }

    #[tokio::test]
    async fn test_ready_before_models_load() {
        let (status, body) = send(app(), get("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], false);
    }

    #[tokio::test]
    async fn test_missing_server_token_is_500() {
        let mut config = test_config();
        config.server.api_token = String::new();
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/png", &png_bytes()));
        let (status, body) = send(app_with(config, false), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "API token not set");
    }

    #[tokio::test]
    async fn test_wrong_token_is_401() {
        let body = multipart_body("image", "image/png", &png_bytes());
        let (status, _) = send(app(), estimate_request(Some("nope"), body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(app(), estimate_request(None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid token");
    }

    #[tokio::test]
    async fn test_disallowed_content_type_is_415() {
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/gif", b"GIF89a"));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["detail"], "Only jpeg, jpg, png, webp supported");
    }

    #[tokio::test]
    async fn test_webp_refused_when_disabled() {
        let mut config = test_config();
        config.limits.allow_webp = false;
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/webp", b"RIFF"));
        let (status, body) = send(app_with(config, false), request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["detail"], "Only jpeg, jpg, png supported");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let mut config = test_config();
        config.limits.max_upload_mb = 0.001;
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/png", &[0u8; 4096]));
        let (status, body) = send(app_with(config, false), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Payload too large"));
    }

    #[tokio::test]
    async fn test_missing_image_field_is_400() {
        let request = estimate_request(Some(TOKEN), multipart_body("file", "image/png", &png_bytes()));
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_estimate_success_then_ready() {
        let app = app();
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/png", &png_bytes()));
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dish_name"], "Biryani or Chicken Curry");
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert!(body["preview_image_id"].as_str().unwrap().starts_with("img_"));
        assert_eq!(body["meta"]["model_loaded"], true);
        assert_eq!(body["meta"]["content_type"], "image/png");
        assert_eq!(body["meta"]["size_bytes"], png_bytes().len());
        assert_eq!(body["meta"]["client_ip"], Value::Null);

        let (_, ready) = send(app.clone(), get("/ready")).await;
        assert_eq!(ready["ready"], true);
        let (_, health) = send(app, get("/health")).await;
        assert_eq!(health["models"], serde_json::json!(["general"]));
    }

    #[tokio::test]
    async fn test_model_load_failure_is_500_and_not_ready() {
        let app = app_with(test_config(), true);
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/png", &png_bytes()));
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "estimation error: No vision model available");

        let (_, ready) = send(app, get("/ready")).await;
        assert_eq!(ready["ready"], false);
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_500() {
        let request = estimate_request(Some(TOKEN), multipart_body("image", "image/png", b"not a png"));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("estimation error:"));
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/estimate")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "x-api-token")
            .body(Body::empty())
            .unwrap()
    }

    fn allow_origin(response: &axum::response::Response) -> Option<String> {
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        let response = app()
            .oneshot(preflight("http://anywhere.test"))
            .await
            .unwrap();
        assert_eq!(allow_origin(&response).as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_cors_list_allows_only_listed_origins() {
        let mut config = test_config();
        config.server.cors_origins = "http://localhost:3000, https://app.example.com".to_string();
        let app = app_with(config, false);

        let response = app
            .clone()
            .oneshot(preflight("https://app.example.com"))
            .await
            .unwrap();
        assert_eq!(
            allow_origin(&response).as_deref(),
            Some("https://app.example.com")
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-credentials")
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );

        let response = app
            .oneshot(preflight("https://evil.example.org"))
            .await
            .unwrap();
        assert_eq!(allow_origin(&response), None);
    }
}
