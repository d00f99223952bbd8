//! Request handlers for the subscribe service control surface.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use kafka_relay_registry::handle_validate_message;
use relay_types::{now_iso, ApiError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::StartOutcome;
use crate::{worker, AppState};

#[derive(Debug, Deserialize)]
pub struct StartConsumingRequest {
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateMessageRequest {
    pub message: Option<Value>,
    pub schema_subject: Option<String>,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = state.session.status().await;
    Json(json!({
        "status": "OK",
        "service": "Consumer",
        "isConsuming": status.is_consuming,
        "currentTopics": status.topics,
        "timestamp": now_iso(),
    }))
}

/// `POST /start-consuming`
///
/// Starting an already-running session is a no-op that reports the
/// existing topic set. A subscribe failure rolls the session back to
/// stopped and surfaces as a 500.
pub async fn start_consuming(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartConsumingRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.topics.is_empty() {
        return Err(ApiError::bad_request("Topics array is required"));
    }

    match state.session.start(req.topics.clone()).await {
        StartOutcome::AlreadyRunning(topics) => Ok(Json(json!({
            "success": true,
            "message": "Consumer is already running",
            "topics": topics,
            "timestamp": now_iso(),
        }))),
        StartOutcome::Started { token, epoch } => {
            let consumer = match worker::subscribe(&state.config, &req.topics) {
                Ok(consumer) => consumer,
                Err(e) => {
                    state.session.rollback(epoch).await;
                    tracing::error!("Error starting consumer: {e:#}");
                    return Err(ApiError::upstream(
                        "Failed to start consumer",
                        format!("{e:#}"),
                    ));
                }
            };

            tokio::spawn(worker::run_loop(
                consumer,
                state.registry.clone(),
                state.config.schema_subject.clone(),
                state.fanout.clone(),
                token,
            ));

            tracing::info!("Consumer started successfully");
            Ok(Json(json!({
                "success": true,
                "message": "Consumer started successfully",
                "topics": req.topics,
                "timestamp": now_iso(),
            })))
        }
    }
}

/// `POST /stop-consuming` — a no-op when already stopped, still a 200.
pub async fn stop_consuming(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.session.stop().await;
    Json(json!({
        "success": true,
        "message": "Consumer stopped successfully",
        "timestamp": now_iso(),
    }))
}

/// `GET /status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let status = state.session.status().await;
    Json(json!({
        "isConsuming": status.is_consuming,
        "currentTopics": status.topics,
        "timestamp": now_iso(),
    }))
}

/// `POST /validate-message` — same contract as the publish service's.
pub async fn validate_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(message) = req.message else {
        return Err(ApiError::bad_request("Message is required"));
    };
    let subject = req
        .schema_subject
        .unwrap_or_else(|| state.config.schema_subject.clone());

    let body = handle_validate_message(&state.registry, &subject, &message).await?;
    Ok(Json(body))
}
