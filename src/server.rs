//! HTTP surface of the relay.
//!
//! Routes:
//! - `GET /` — liveness probe.
//! - `GET /webhook` — subscription handshake.
//! - `POST /webhook` — inbound Messenger/Instagram events.
//! - `POST /test` — diagnostic echo, bypasses the workflow and dispatch.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::relay::Relay;
use crate::webhook::{VerifyOutcome, VerifyParams, verify};

/// Shared state for the relay routes.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub verify_token: SecretString,
}

/// Build the relay router. CORS is permissive; the webhook sits behind
/// assorted tunnel/proxy frontends during setup.
pub fn relay_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/webhook", get(verify_webhook).post(handle_webhook))
        .route("/test", post(test_endpoint))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / — confirm the server is up.
async fn home() -> impl IntoResponse {
    Json(json!({
        "status": "Webhook server is running!",
        "message": "Facebook/Instagram webhook server for Langflow integration",
    }))
}

/// GET /webhook — Meta's subscription handshake.
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    match verify(&params, &state.verify_token) {
        VerifyOutcome::Verified(challenge) => (StatusCode::OK, challenge).into_response(),
        VerifyOutcome::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        VerifyOutcome::BadRequest => (StatusCode::BAD_REQUEST, "Bad Request").into_response(),
    }
}

/// POST /webhook — relay inbound events.
///
/// The body is parsed manually so a top-level parse failure answers 500 with
/// the error detail; everything downstream of a successful parse answers 200
/// regardless of per-message delivery outcomes.
async fn handle_webhook(State(state): State<AppState>, body: String) -> Response {
    let payload: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "Error processing webhook");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response();
        }
    };

    tracing::debug!(payload = %payload, "Received webhook data");

    state.relay.handle_event(&payload).await;

    (StatusCode::OK, Json(json!({"status": "success"}))).into_response()
}

/// POST /test — simulate message processing without touching Langflow or the
/// Graph API.
async fn test_endpoint(body: String) -> Response {
    let data: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "Test endpoint error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response();
        }
    };

    let message = data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Hello!");
    let user_id = data
        .get("user_id")
        .and_then(Value::as_str)
        .unwrap_or("test_user");

    tracing::info!(user_id, message, "Test message");

    Json(json!({
        "status": "success",
        "input": message,
        "output": test_echo(message),
        "user_id": user_id,
    }))
    .into_response()
}

/// The canned reply the diagnostic endpoint produces.
fn test_echo(message: &str) -> String {
    format!("Test response: I received your message '{message}'")
}
