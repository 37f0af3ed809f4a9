//! HTTP surface: `/recipe`, `/health`, `/ping` and `/send`, served at the
//! root and again under `/api`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::orchestrator::RecipeOrchestrator;
use crate::relay::EmailRelay;

/// Shared, read-only state behind every handler
pub struct AppState {
    pub orchestrator: RecipeOrchestrator,
    pub relay: EmailRelay,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, RecipeError> {
        Ok(AppState {
            orchestrator: RecipeOrchestrator::new(config)?,
            relay: EmailRelay::new(config)?,
        })
    }
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
}

impl From<&RecipeError> for ErrorPayload {
    fn from(err: &RecipeError) -> Self {
        let mut payload = ErrorPayload {
            error: err.client_message(),
            details: None,
            hint: err.hint(),
            raw: None,
            received: None,
        };

        match err {
            RecipeError::InvalidInput { received, .. } => payload.received = Some(received.clone()),
            RecipeError::InvalidModelResponse { raw } => payload.raw = Some(raw.clone()),
            RecipeError::Upstream { details, .. } | RecipeError::Webhook { details, .. } => {
                payload.details = details.clone()
            }
            _ => {}
        }

        payload
    }
}

fn status_of(err: &RecipeError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            error!("Request failed ({}): {}", status.as_u16(), self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(ErrorPayload::from(&self))).into_response()
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
}

fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recipe", post(recipe))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/send", post(send))
}

/// Request bodies are read leniently; anything that is not JSON is treated
/// as an empty body and rejected by validation downstream.
fn lenient_json(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

async fn recipe(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = lenient_json(&body);
    info!("POST /recipe");

    match state.orchestrator.generate(&body).await {
        Ok(recipe) => Json(recipe).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn ping(State(state): State<Arc<AppState>>) -> Response {
    info!("GET /ping");

    match state.orchestrator.ping().await {
        Ok(ping) => Json(ping).into_response(),
        Err(e) => {
            let status = status_of(&e);
            warn!("Ping failed ({}): {}", status.as_u16(), e);
            let details = match &e {
                RecipeError::Upstream { details, .. } => details.clone(),
                _ => None,
            };
            (
                status,
                Json(json!({ "ok": false, "error": e.client_message(), "details": details })),
            )
                .into_response()
        }
    }
}

async fn send(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = lenient_json(&body);
    info!("POST /send");

    match state.relay.send(&body).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => e.into_response(),
    }
}
