//! Kafka producer and admin plumbing for the publish service.

use std::time::Duration;

use anyhow::{Context, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
const ADMIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka access for the publish service: one long-lived producer plus an
/// admin client for topic management.
pub struct KafkaPublisher {
    producer: FutureProducer,
    admin: AdminClient<DefaultClientContext>,
}

impl KafkaPublisher {
    pub fn new(brokers: &str, client_id: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", client_id)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .create()
            .context("Failed to create Kafka admin client")?;

        Ok(Self { producer, admin })
    }

    /// Send one serialized message and await the delivery report.
    ///
    /// Exactly one broker send per call; delivery retries are the client
    /// library's job, not this layer's.
    pub async fn send(&self, topic: &str, key: &str, payload: &str) -> Result<()> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        self.producer
            .send(record, DELIVERY_TIMEOUT)
            .await
            .map_err(|(err, _)| err)
            .with_context(|| format!("Failed to send message to topic {topic}"))?;

        Ok(())
    }

    /// List topic names from cluster metadata, skipping internal topics.
    ///
    /// `fetch_metadata` blocks the calling thread, so it runs on the
    /// blocking pool.
    pub async fn list_topics(&self) -> Result<Vec<String>> {
        let producer = self.producer.clone();

        let names = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let metadata = producer
                .client()
                .fetch_metadata(None, ADMIN_TIMEOUT)
                .context("Failed to fetch cluster metadata")?;

            Ok(metadata
                .topics()
                .iter()
                .map(|t| t.name().to_string())
                .filter(|name| !name.starts_with("__"))
                .collect())
        })
        .await
        .context("Metadata task panicked")??;

        Ok(names)
    }

    /// Create a topic, treating "already exists" as success.
    pub async fn create_topic(&self, topic: &str, partitions: i32, replication: i32) -> Result<()> {
        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(replication));
        let opts = AdminOptions::new().operation_timeout(Some(ADMIN_TIMEOUT));

        let results = self
            .admin
            .create_topics(&[new_topic], &opts)
            .await
            .context("Failed to create topic")?;

        for result in results {
            match result {
                Ok(name) => {
                    tracing::info!("Topic '{name}' created successfully");
                }
                Err((name, err)) => {
                    if err.to_string().contains("already exists") {
                        tracing::info!("Topic '{name}' already exists");
                    } else {
                        return Err(anyhow::anyhow!("Failed to create topic '{name}': {err}"));
                    }
                }
            }
        }

        Ok(())
    }
}
