//! Control-surface tests that exercise the handlers directly. No broker is
//! needed: the request guards and session transitions under test all run
//! before any Kafka interaction.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use clap::Parser;
use kafka_relay_consumer::fanout::Fanout;
use kafka_relay_consumer::handlers::{self, StartConsumingRequest};
use kafka_relay_consumer::session::SubscriptionSession;
use kafka_relay_consumer::{AppState, Config};
use kafka_relay_registry::RegistryClient;
use serde_json::json;

fn test_state() -> Arc<AppState> {
    // Defaults only; nothing in these tests reaches the registry or broker
    let config = Config::parse_from(["kafka-relay-consumer"]);
    let registry = RegistryClient::new(&config.registry_url).unwrap();

    Arc::new(AppState {
        session: SubscriptionSession::new(),
        fanout: Fanout::new(8),
        registry,
        config,
    })
}

#[tokio::test]
async fn test_start_consuming_empty_topics_is_400_and_stays_stopped() {
    let state = test_state();

    let err = handlers::start_consuming(
        State(Arc::clone(&state)),
        Json(StartConsumingRequest { topics: vec![] }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.body["error"], json!("Topics array is required"));

    let status = state.session.status().await;
    assert!(!status.is_consuming);
    assert!(status.topics.is_empty());
}

#[tokio::test]
async fn test_stop_consuming_while_stopped_is_200() {
    let state = test_state();

    let Json(body) = handlers::stop_consuming(State(Arc::clone(&state))).await;

    assert_eq!(body["success"], json!(true));
    assert!(!state.session.status().await.is_consuming);
}
