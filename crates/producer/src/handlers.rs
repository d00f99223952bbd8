//! Request handlers for the publish service.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use kafka_relay_registry::{
    handle_validate_message, validate_user_message, SchemaDescriptor, ValidationError,
};
use relay_types::{now_iso, ApiError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

const DEFAULT_KEY: &str = "default-key";

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub message: Value,
    pub key: Option<String>,
    #[serde(default = "default_true")]
    pub validate_schema: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateMessageRequest {
    pub message: Option<Value>,
    pub schema_subject: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_partitions")]
    pub partitions: i32,
    #[serde(default = "default_replication")]
    pub replication_factor: i32,
}

fn default_partitions() -> i32 {
    1
}

fn default_replication() -> i32 {
    1
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": "Producer",
        "timestamp": now_iso(),
    }))
}

/// `POST /send-message`
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let missing_message =
        req.message.is_null() || req.message.as_str().is_some_and(str::is_empty);
    if req.topic.is_empty() || missing_message {
        return Err(ApiError::bad_request("Topic and message are required"));
    }

    // The response echoes the message exactly as submitted
    let sent_message = req.message.clone();

    let body = if req.validate_schema && req.topic.contains("user") {
        let schema = state
            .registry
            .fetch_latest(&state.config.schema_subject)
            .await;
        resolve_outbound_body(req.message, schema.as_ref())
            .map_err(|rejection| rejection.into_api_error(&state.config.schema_subject))?
    } else {
        req.message
    };

    let key = req.key.unwrap_or_else(|| DEFAULT_KEY.to_string());
    let payload = crate::wrap_outbound(body, req.validate_schema, &state.config.client_id);
    let serialized = payload.to_string();

    if let Err(e) = state.kafka.send(&req.topic, &key, &serialized).await {
        tracing::error!("Error sending message to {}: {e:#}", req.topic);
        return Err(ApiError::upstream("Failed to send message", format!("{e:#}")));
    }

    tracing::info!("Message sent to topic {}", req.topic);
    Ok(Json(json!({
        "success": true,
        "message": "Message sent successfully",
        "topic": req.topic,
        "sentMessage": sent_message,
        "timestamp": now_iso(),
        "schemaValidated": req.validate_schema,
    })))
}

/// `POST /validate-message`
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

/// `GET /topics`
pub async fn get_topics(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match state.kafka.list_topics().await {
        Ok(topics) => Ok(Json(json!({ "topics": topics }))),
        Err(e) => {
            tracing::error!("Error getting topics: {e:#}");
            Err(ApiError::upstream("Failed to get topics", format!("{e:#}")))
        }
    }
}

/// `POST /topics`
pub async fn create_topic(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTopicRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.topic.is_empty() {
        return Err(ApiError::bad_request("Topic name is required"));
    }

    match state
        .kafka
        .create_topic(&req.topic, req.partitions, req.replication_factor)
        .await
    {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": format!("Topic {} created successfully", req.topic),
            "topic": req.topic,
            "partitions": req.partitions,
            "replicationFactor": req.replication_factor,
        }))),
        Err(e) => {
            tracing::error!("Error creating topic {}: {e:#}", req.topic);
            Err(ApiError::upstream("Failed to create topic", format!("{e:#}")))
        }
    }
}

/// Why a message was rejected before reaching the broker.
#[derive(Debug, PartialEq, Eq)]
pub enum OutboundRejection {
    /// `message` was a JSON string that did not parse.
    InvalidJson,
    /// The schema rules rejected the message.
    Failed(ValidationError),
}

impl OutboundRejection {
    fn into_api_error(self, subject: &str) -> ApiError {
        match self {
            Self::InvalidJson => ApiError::bad_request_body(json!({
                "error": "Invalid JSON format",
                "details": "Message field contains invalid JSON string",
                "schema": subject,
            })),
            Self::Failed(e) => ApiError::bad_request_body(json!({
                "error": "Schema validation failed",
                "details": e.to_string(),
                "schema": subject,
            })),
        }
    }
}

/// Apply the pre-send validation policy.
///
/// No schema in the registry soft-fails: the message goes out unvalidated
/// with a warning. A rule violation aborts the send entirely. String
/// messages are parsed first so the broker receives structured JSON.
pub fn resolve_outbound_body(
    message: Value,
    schema: Option<&SchemaDescriptor>,
) -> Result<Value, OutboundRejection> {
    let Some(schema) = schema else {
        tracing::warn!("Schema not found in registry, skipping validation");
        return Ok(message);
    };

    let parsed = match message {
        Value::String(raw) => {
            serde_json::from_str::<Value>(&raw).map_err(|_| OutboundRejection::InvalidJson)?
        }
        other => other,
    };

    validate_user_message(&parsed).map_err(OutboundRejection::Failed)?;
    tracing::debug!(
        "Message validated against schema {} v{}",
        schema.subject,
        schema.version
    );
    Ok(parsed)
}
