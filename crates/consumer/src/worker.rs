//! The receive loop: decode each record, annotate it, fan it out.

use anyhow::Context;
use kafka_relay_registry::{validate_user_message, RegistryClient};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message};
use relay_types::{now_iso, InboundEvent, SchemaValidation};
use tokio_util::sync::CancellationToken;

use crate::fanout::Fanout;
use crate::Config;

/// Build a stream consumer and subscribe it to the topic set.
///
/// Consumption starts at the latest offsets; the dashboard shows a live
/// window, not history.
pub fn subscribe(config: &Config, topics: &[String]) -> anyhow::Result<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", config.brokers.join(","))
        .set("group.id", config.group_id.as_str())
        .set("client.id", config.client_id.as_str())
        .set("session.timeout.ms", "30000")
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "latest")
        .create()
        .context("Failed to create Kafka consumer")?;

    let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
    consumer
        .subscribe(&topic_refs)
        .context("Failed to subscribe to topics")?;

    for topic in topics {
        tracing::info!("Subscribed to topic: {topic}");
    }

    Ok(consumer)
}

/// Consume records until the token is cancelled.
///
/// Failures are isolated at per-record granularity: a record that cannot
/// be decoded still produces an event, and a consumer-level receive error
/// is logged without ending the loop.
pub async fn run_loop(
    consumer: StreamConsumer,
    registry: RegistryClient,
    subject: String,
    fanout: Fanout,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Receive loop stopped");
                break;
            }
            result = consumer.recv() => match result {
                Ok(record) => {
                    let event = process_record(
                        &registry,
                        &subject,
                        record.topic(),
                        record.partition(),
                        record.offset(),
                        record.key(),
                        record.payload().unwrap_or_default(),
                    )
                    .await;

                    let topic = event.topic.clone();
                    let offset = event.offset;
                    let reached = fanout.broadcast(event);
                    tracing::debug!("Broadcast {topic}@{offset} to {reached} listeners");
                }
                Err(e) => {
                    tracing::error!("Error receiving message: {e}");
                }
            }
        }
    }
    // Dropping the consumer leaves the group and releases the broker
    // connection, after the loop has stopped broadcasting.
}

/// Decode one record and attach the validation outcome.
///
/// Never drops the record: an undecodable payload produces an event
/// carrying the raw text and the parse error. A registry failure attaches
/// no validation outcome at all, which is distinct from an invalid one.
pub async fn process_record(
    registry: &RegistryClient,
    subject: &str,
    topic: &str,
    partition: i32,
    offset: i64,
    key: Option<&[u8]>,
    payload: &[u8],
) -> InboundEvent {
    let raw = String::from_utf8_lossy(payload).into_owned();
    let key = key.map(|k| String::from_utf8_lossy(k).into_owned());

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => {
            let schema_validation = if topic.contains("user") {
                annotate(registry, subject, &value).await
            } else {
                None
            };

            InboundEvent {
                topic: topic.to_string(),
                partition,
                offset,
                key,
                value,
                timestamp: now_iso(),
                schema_validation,
                is_json: true,
                parse_error: None,
            }
        }
        Err(parse_error) => {
            tracing::warn!(
                "Non-JSON message received in topic {topic}: {}",
                raw.chars().take(100).collect::<String>()
            );

            InboundEvent {
                topic: topic.to_string(),
                partition,
                offset,
                key,
                value: serde_json::Value::String(raw),
                timestamp: now_iso(),
                schema_validation: None,
                is_json: false,
                parse_error: Some(parse_error.to_string()),
            }
        }
    }
}

/// Registry lookup plus validation for records on schema-governed topics.
async fn annotate(
    registry: &RegistryClient,
    subject: &str,
    value: &serde_json::Value,
) -> Option<SchemaValidation> {
    let schema = registry.fetch_latest(subject).await?;

    match validate_user_message(value) {
        Ok(()) => {
            tracing::debug!(
                "Message validated against schema {} v{}",
                schema.subject,
                schema.version
            );
            Some(SchemaValidation::valid(schema.info()))
        }
        Err(e) => {
            tracing::warn!("Message failed schema validation: {e}");
            Some(SchemaValidation::invalid(e.to_string(), subject))
        }
    }
}
