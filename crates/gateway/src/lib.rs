//! HTTP gateway for Dojo.
//!
//! Exposes the research loop as a server-sent event stream plus readiness
//! endpoints. The AI routes are served both at the root and under `/api/ai`
//! so existing frontends keep working.
//!
//! Built on Axum.

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::sse::{Event as SseEvent, Sse};
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use dojo_agent::Orchestrator;
use dojo_config::AppConfig;
use dojo_core::Provider;
use dojo_providers::{GatewayConfig, OpenAiCompatProvider};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub orchestrator: Arc<Orchestrator>,
    /// Last probe result; replaced only by an explicit probe.
    pub status: RwLock<GatewayConfig>,
}

impl GatewayState {
    pub fn new(config: AppConfig, orchestrator: Arc<Orchestrator>, status: GatewayConfig) -> Self {
        Self {
            config,
            orchestrator,
            status: RwLock::new(status),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Routes for the research assistant, mounted twice by [`build_router`].
fn ai_routes() -> Router<SharedState> {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/status", get(status_handler))
        .route("/probe", post(probe_handler))
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS (any origin unless `server.cors_origins` is set)
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health_handler))
        .merge(ai_routes())
        .nest("/api/ai", ai_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
///
/// Probes the model endpoint once before listening. A failed probe is not
/// fatal: chat requests get 503 until `POST /probe` succeeds.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr();

    let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::from_config(&config.model)?);
    let orchestrator = Arc::new(Orchestrator::from_config(provider.clone(), &config)?);

    let status = dojo_providers::probe(provider.as_ref()).await;
    if !status.ready {
        warn!(
            url = %config.model.base_url,
            "Model endpoint not available; start it and POST /probe"
        );
    }

    let state = Arc::new(GatewayState::new(config, orchestrator, status));
    let app = build_router(state);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- Handlers ---

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

/// `POST /chat`: run the research loop and stream progress as SSE.
async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<
    Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>,
    (StatusCode, Json<ErrorResponse>),
> {
    let message = payload
        .ok()
        .and_then(|Json(req)| req.message)
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "message required"))?;

    let status = state.status.read().await.clone();
    if !status.ready {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "AI not ready. Is the model server running?",
        ));
    }

    info!(message_len = message.len(), "Chat request");

    let rx = state.orchestrator.run_stream(message, status);
    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().data(data))
    });

    Ok(Sse::new(stream))
}

/// `GET /status`: readiness and model display name.
async fn status_handler(State(state): State<SharedState>) -> Json<GatewayConfig> {
    Json(state.status.read().await.clone())
}

/// `POST /probe`: re-check the model endpoint and store the result.
async fn probe_handler(State(state): State<SharedState>) -> Json<GatewayConfig> {
    let status = dojo_providers::probe(state.orchestrator.provider().as_ref()).await;
    *state.status.write().await = status.clone();
    Json(status)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use dojo_core::error::ProviderError;
    use dojo_core::message::Message;
    use dojo_core::provider::{ProviderRequest, ProviderResponse};
    use dojo_core::tool::ToolRegistry;
    use dojo_core::ProgressEvent;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Provider that answers every request with the same text.
    struct FixedProvider(Result<String, ProviderError>);

    #[async_trait::async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let text = self.0.clone()?;
            Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: "fixed".into(),
            })
        }
    }

    fn state_with(provider: Arc<dyn Provider>, status: GatewayConfig) -> SharedState {
        let orchestrator = Arc::new(Orchestrator::new(provider, Arc::new(ToolRegistry::new())));
        Arc::new(GatewayState::new(AppConfig::default(), orchestrator, status))
    }

    fn answering(text: &str) -> SharedState {
        state_with(
            Arc::new(FixedProvider(Ok(text.into()))),
            GatewayConfig::ready("fixed"),
        )
    }

    fn chat_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).to_string()
    }

    /// Parse `data: <json>\n\n` frames into events.
    fn parse_frames(text: &str) -> Vec<ProgressEvent> {
        text.split("\n\n")
            .filter(|frame| !frame.trim().is_empty())
            .map(|frame| {
                let data = frame
                    .strip_prefix("data: ")
                    .unwrap_or_else(|| panic!("not a data frame: {frame:?}"));
                serde_json::from_str(data).unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(answering("x"));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn chat_streams_data_frames_until_done() {
        let app = build_router(answering("Hi there!"));
        let response = app
            .oneshot(chat_request("/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        assert!(content_type.contains("text/event-stream"));

        let text = body_text(response).await;
        assert!(!text.contains("event:"), "unexpected named events: {text}");
        assert_eq!(
            parse_frames(&text),
            vec![
                ProgressEvent::Stream {
                    content: "Hi there!".into()
                },
                ProgressEvent::Done {
                    content: "Hi there!".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn chat_is_also_served_under_api_prefix() {
        let app = build_router(answering("ok"));
        let response = app
            .oneshot(chat_request("/api/ai/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let events = parse_frames(&body_text(response).await);
        assert!(events.last().is_some_and(|e| e.is_terminal()));
    }

    #[tokio::test]
    async fn gateway_failure_streams_single_error() {
        let state = state_with(
            Arc::new(FixedProvider(Err(ProviderError::ApiError {
                status_code: 500,
                message: "Internal Server Error".into(),
            }))),
            GatewayConfig::ready("fixed"),
        );
        let response = build_router(state)
            .oneshot(chat_request("/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let events = parse_frames(&body_text(response).await);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "error");
    }

    #[tokio::test]
    async fn missing_or_blank_message_is_400() {
        for body in [r#"{}"#, r#"{"message":"   "}"#, r#"{"message":42}"#, "not json"] {
            let response = build_router(answering("x"))
                .oneshot(chat_request("/chat", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let json: serde_json::Value =
                serde_json::from_str(&body_text(response).await).unwrap();
            assert_eq!(json["message"], "message required");
        }
    }

    #[tokio::test]
    async fn not_ready_is_503() {
        let state = state_with(
            Arc::new(FixedProvider(Ok("unused".into()))),
            GatewayConfig::not_ready(),
        );
        let response = build_router(state)
            .oneshot(chat_request("/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["message"].as_str().unwrap().contains("not ready"));
    }

    #[tokio::test]
    async fn status_reports_ready_and_model() {
        let response = build_router(answering("x"))
            .oneshot(
                Request::builder()
                    .uri("/api/ai/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!({"ready": true, "model": "fixed"}));
    }

    #[tokio::test]
    async fn probe_flips_readiness() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "lmstudio-community/gpt-oss-20b.gguf"}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiCompatProvider::new(
            "lm_studio",
            server.uri(),
            None,
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        let state = state_with(Arc::new(provider), GatewayConfig::not_ready());
        let app = build_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/probe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, serde_json::json!({"ready": true, "model": "gpt-oss-20b"}));
        assert!(state.status.read().await.ready);
    }

    #[test]
    fn invalid_cors_origins_are_skipped() {
        // Building the layer must not panic on junk input.
        let _ = cors_layer(&["http://localhost:5173".into(), "not a\nheader".into()]);
    }
}
