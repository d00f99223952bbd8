//! Integration tests for the registry client against an in-process mock
//! Schema Registry served by axum on an ephemeral port.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use kafka_relay_registry::{handle_validate_message, RegistryClient};
use serde_json::json;
use tokio::net::TcpListener;

async fn latest_version(Path(subject): Path<String>) -> axum::response::Response {
    if subject == "user-value" {
        Json(json!({
            "subject": "user-value",
            "version": 2,
            "id": 7,
            "schema": r#"{"type":"record","name":"User"}"#,
        }))
        .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error_code": 40401, "message": "Subject not found"})),
        )
            .into_response()
    }
}

/// Start a mock registry and return its base URL.
async fn start_mock_registry() -> anyhow::Result<String> {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let app = Router::new().route("/subjects/:subject/versions/latest", get(latest_version));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn test_fetch_latest_known_subject() {
    let base_url = start_mock_registry().await.unwrap();
    let client = RegistryClient::new(&base_url).unwrap();

    let schema = client.fetch_latest("user-value").await.unwrap();
    assert_eq!(schema.subject, "user-value");
    assert_eq!(schema.version, 2);
    assert_eq!(schema.id, 7);
    assert!(schema.schema.contains("record"));
}

#[tokio::test]
async fn test_fetch_latest_unknown_subject_is_none() {
    let base_url = start_mock_registry().await.unwrap();
    let client = RegistryClient::new(&base_url).unwrap();

    assert!(client.fetch_latest("orders-value").await.is_none());
}

#[tokio::test]
async fn test_fetch_latest_unreachable_registry_is_none() {
    // Nothing listens on port 1
    let client = RegistryClient::new("http://127.0.0.1:1").unwrap();
    assert!(client.fetch_latest("user-value").await.is_none());
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() {
    let base_url = start_mock_registry().await.unwrap();
    let client = RegistryClient::new(&format!("{base_url}/")).unwrap();

    assert!(client.fetch_latest("user-value").await.is_some());
}

#[tokio::test]
async fn test_validate_endpoint_body_valid_message() {
    let base_url = start_mock_registry().await.unwrap();
    let client = RegistryClient::new(&base_url).unwrap();

    let message = json!({"name": "Ann", "age": 30});
    let body = handle_validate_message(&client, "user-value", &message)
        .await
        .unwrap();

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["schema"]["subject"], json!("user-value"));
    assert_eq!(body["schema"]["version"], json!(2));
    assert_eq!(body["validatedMessage"], message);
}

#[tokio::test]
async fn test_validate_endpoint_body_invalid_message() {
    let base_url = start_mock_registry().await.unwrap();
    let client = RegistryClient::new(&base_url).unwrap();

    let message = json!({"age": 30});
    let err = handle_validate_message(&client, "user-value", &message)
        .await
        .unwrap_err();

    assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(err.body["success"], json!(false));
    assert_eq!(err.body["details"], json!("Поле name должно быть строкой"));
    assert_eq!(err.body["schema"]["id"], json!(7));
}

#[tokio::test]
async fn test_validate_endpoint_missing_schema_is_404() {
    let base_url = start_mock_registry().await.unwrap();
    let client = RegistryClient::new(&base_url).unwrap();

    let message = json!({"name": "Ann", "age": 30});
    let err = handle_validate_message(&client, "orders-value", &message)
        .await
        .unwrap_err();

    assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(err.body["error"], json!("Schema not found"));
    assert_eq!(err.body["schemaSubject"], json!("orders-value"));
}
