use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app::submit::Submitter;
use crate::broker::BrokerConnection;
use crate::error::GatewayError;

pub const SERVICE_NAME: &str = "vehicle-gateway";

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<BrokerConnection>,
    pub submitter: Arc<Submitter>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "UP",
        "service": SERVICE_NAME,
    }))
}

/// Prometheus text exposition of the gateway's counters and histograms
async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(),
    )
}

/// Connection state and broker configuration echo
async fn status(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let config = state.broker.config();
    Json(json!({
        "service": SERVICE_NAME,
        "artemis_connected": state.broker.is_connected(),
        "artemis_host": config.host,
        "artemis_port": config.port,
        "queue": config.queue,
        "timestamp": chrono::Utc::now(),
    }))
}

fn failure_response(error: &GatewayError) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "error": error.to_string()})),
    )
        .into_response()
}

/// Separates a genuinely absent body (no JSON content type) from a body
/// that was sent but does not parse. The former behaves like null; the
/// latter is a hard validation failure, never a defaulted event.
fn parse_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, GatewayError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Null),
        Err(rejection) => Err(GatewayError::Validation(rejection.to_string())),
    }
}

/// Single-event submission: normalize, forward, report the canonical event.
async fn send_event(
    Extension(state): Extension<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> axum::response::Response {
    // An absent or null body behaves like an empty mapping; every field
    // then takes its documented default.
    let payload = match parse_body(body) {
        Ok(Value::Null) => serde_json::Map::new(),
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return failure_response(&GatewayError::Validation(
                "event payload must be a JSON object".to_string(),
            ))
        }
        Err(e) => return failure_response(&e),
    };

    match state.submitter.submit_one(&payload).await {
        Ok(event) => Json(json!({
            "success": true,
            "event": event,
            "message": "Event sent successfully",
        }))
        .into_response(),
        Err(e) => failure_response(&e),
    }
}

/// Batch submission with per-element error isolation.
async fn send_batch(
    Extension(state): Extension<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> axum::response::Response {
    let body = match parse_body(body) {
        Ok(Value::Null) => Value::Array(Vec::new()),
        Ok(value) => value,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match state.submitter.submit_batch(body).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Create the HTTP server with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/status", get(status))
        .route("/api/send", post(send_event))
        .route("/api/send/batch", post(send_batch))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

/// Serve until ctrl-c; the caller tears down the broker connection after.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
) -> std::result::Result<(), hyper::Error> {
    let app = create_router(state);

    info!("HTTP server running on http://{addr}");

    Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}
