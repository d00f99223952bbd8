//! Publish service: HTTP control surface in front of a Kafka producer.
//!
//! Endpoints:
//! - `GET /health`
//! - `POST /send-message` — validate (when the topic is schema-governed),
//!   wrap with producer metadata, send once to the broker
//! - `POST /validate-message` — explicit validation against the registry
//! - `GET /topics` / `POST /topics` — pass-through to broker admin

pub mod handlers;
pub mod kafka;

use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use kafka_relay_registry::RegistryClient;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::kafka::KafkaPublisher;

/// Publish service configuration. Every knob has an environment fallback so
/// the service can be configured entirely from the deployment environment.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Listen port
    #[clap(long, default_value_t = 3000, env = "PORT")]
    pub port: u16,
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(
        long,
        value_delimiter = ',',
        default_value = "localhost:9092",
        env = "KAFKA_BROKER"
    )]
    pub brokers: Vec<String>,
    /// Schema Registry base URL
    #[clap(long, default_value = "http://localhost:8081", env = "SCHEMA_REGISTRY_URL")]
    pub registry_url: String,
    /// Subject holding the user message schema
    #[clap(long, default_value = "user-value", env = "SCHEMA_SUBJECT")]
    pub schema_subject: String,
    /// Kafka client id, also stamped on outgoing messages
    #[clap(long, default_value = "demo-producer", env = "KAFKA_CLIENT_ID")]
    pub client_id: String,
    /// Allowed CORS origins ("*" for any)
    #[clap(
        long = "cors-origin",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:3002",
        env = "CORS_ORIGINS"
    )]
    pub cors_origins: Vec<String>,
}

pub struct AppState {
    pub kafka: KafkaPublisher,
    pub registry: RegistryClient,
    pub config: Config,
}

/// Build the publish service router.
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/send-message", post(handlers::send_message))
        .route("/validate-message", post(handlers::validate_message))
        .route(
            "/topics",
            get(handlers::get_topics).post(handlers::create_topic),
        )
        .layer(cors)
        .with_state(state)
}

/// Run the publish service until `shutdown` fires.
pub async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    let brokers = config.brokers.join(",");
    let kafka = KafkaPublisher::new(&brokers, &config.client_id)?;
    let registry = RegistryClient::new(&config.registry_url)?;
    let cors = relay_types::cors_layer(&config.cors_origins)?;
    let port = config.port;

    let state = Arc::new(AppState {
        kafka,
        registry,
        config,
    });

    let app = router(state, cors);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!("Producer service running on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("Producer HTTP server failed")?;

    // The producer and admin clients are dropped here, after the server
    // has drained; in-flight sends were already awaited by their handlers.
    tracing::info!("Producer service stopped");
    Ok(())
}

/// Wrap the outgoing body with producer metadata.
///
/// Object bodies keep their fields; anything else is nested under a
/// `message` key first so the payload survives the merge.
pub fn wrap_outbound(body: Value, schema_validated: bool, producer_id: &str) -> Value {
    let mut map = match body {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("message".to_string(), other);
            map
        }
    };

    map.insert(
        "timestamp".to_string(),
        Value::String(relay_types::now_iso()),
    );
    map.insert(
        "producer".to_string(),
        Value::String(producer_id.to_string()),
    );
    map.insert("schemaValidated".to_string(), Value::Bool(schema_validated));

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_outbound_merges_object_fields() {
        let wrapped = wrap_outbound(json!({"name": "Ann", "age": 30}), true, "demo-producer");

        assert_eq!(wrapped["name"], json!("Ann"));
        assert_eq!(wrapped["age"], json!(30));
        assert_eq!(wrapped["producer"], json!("demo-producer"));
        assert_eq!(wrapped["schemaValidated"], json!(true));
        assert!(wrapped["timestamp"].is_string());
    }

    #[test]
    fn test_wrap_outbound_nests_non_object_bodies() {
        let wrapped = wrap_outbound(json!("plain text"), false, "demo-producer");

        assert_eq!(wrapped["message"], json!("plain text"));
        assert_eq!(wrapped["schemaValidated"], json!(false));
    }

    #[test]
    fn test_wrap_outbound_metadata_wins_over_body_fields() {
        let wrapped = wrap_outbound(json!({"producer": "spoofed"}), true, "demo-producer");
        assert_eq!(wrapped["producer"], json!("demo-producer"));
    }
}
