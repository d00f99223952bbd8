//! Subscribe service: a single Kafka subscription session with live
//! WebSocket fan-out to dashboard clients.
//!
//! One logical session per process: `/start-consuming` subscribes a
//! consumer to a topic set and spawns the receive loop, `/stop-consuming`
//! cancels it. Each delivered record is decoded, optionally validated
//! against the user schema, and broadcast to every connected WebSocket
//! listener. Validation never suppresses delivery; it only annotates it.

pub mod fanout;
pub mod handlers;
pub mod session;
pub mod worker;
pub mod ws;

use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use kafka_relay_registry::RegistryClient;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::fanout::Fanout;
use crate::session::SubscriptionSession;

/// How many events a slow WebSocket listener may fall behind before it
/// starts skipping. There is deliberately no backlog beyond this.
const FANOUT_CAPACITY: usize = 64;

/// Subscribe service configuration. Every knob has an environment fallback.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Listen port
    #[clap(long, default_value_t = 3001, env = "PORT")]
    pub port: u16,
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(
        long,
        value_delimiter = ',',
        default_value = "localhost:9092",
        env = "KAFKA_BROKER"
    )]
    pub brokers: Vec<String>,
    /// Consumer group ID
    #[clap(long, default_value = "demo-consumer-group", env = "KAFKA_GROUP_ID")]
    pub group_id: String,
    /// Schema Registry base URL
    #[clap(long, default_value = "http://localhost:8081", env = "SCHEMA_REGISTRY_URL")]
    pub registry_url: String,
    /// Subject holding the user message schema
    #[clap(long, default_value = "user-value", env = "SCHEMA_SUBJECT")]
    pub schema_subject: String,
    /// Kafka client id
    #[clap(long, default_value = "demo-consumer", env = "KAFKA_CLIENT_ID")]
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
    pub session: SubscriptionSession,
    pub fanout: Fanout,
    pub registry: RegistryClient,
    pub config: Config,
}

/// Build the subscribe service router.
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/start-consuming", post(handlers::start_consuming))
        .route("/stop-consuming", post(handlers::stop_consuming))
        .route("/status", get(handlers::status))
        .route("/validate-message", post(handlers::validate_message))
        .route("/ws", get(ws::upgrade))
        .layer(cors)
        .with_state(state)
}

/// Run the subscribe service until `shutdown` fires.
///
/// Teardown order matters: the subscription loop is stopped before the
/// HTTP server (and with it the fan-out listeners) goes away, so the loop
/// never broadcasts into a dismantled channel.
pub async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    let registry = RegistryClient::new(&config.registry_url)?;
    let cors = relay_types::cors_layer(&config.cors_origins)?;
    let port = config.port;

    let state = Arc::new(AppState {
        session: SubscriptionSession::new(),
        fanout: Fanout::new(FANOUT_CAPACITY),
        registry,
        config,
    });

    let app = router(Arc::clone(&state), cors);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!("Consumer service running on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let state = Arc::clone(&state);
            let shutdown = shutdown.clone();
            async move {
                shutdown.cancelled().await;
                state.session.stop().await;
            }
        })
        .await
        .context("Consumer HTTP server failed")?;

    tracing::info!("Consumer service stopped");
    Ok(())
}
