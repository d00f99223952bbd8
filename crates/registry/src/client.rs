//! HTTP client for a Confluent-compatible Schema Registry.

use std::time::Duration;

use relay_types::SchemaInfo;
use serde::Deserialize;

/// Registry lookups run on the record-processing path, so they carry a
/// bounded timeout: an unreachable registry degrades to "no schema" instead
/// of stalling the consume loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The latest schema registered under a subject. Immutable once fetched;
/// there is no version pinning across calls.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDescriptor {
    pub subject: String,
    pub version: i32,
    pub id: i32,
    /// Raw schema definition as stored in the registry. Not interpreted by
    /// the validator (see `validator` module docs).
    pub schema: String,
}

impl SchemaDescriptor {
    /// Identity triple reported to clients.
    pub fn info(&self) -> SchemaInfo {
        SchemaInfo {
            subject: self.subject.clone(),
            version: self.version,
            id: self.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the latest schema version for `subject`.
    ///
    /// Returns `None` on any failure: unreachable registry, non-2xx
    /// response, malformed body. Callers decide what `None` means at their
    /// call site.
    pub async fn fetch_latest(&self, subject: &str) -> Option<SchemaDescriptor> {
        let url = format!("{}/subjects/{subject}/versions/latest", self.base_url);

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Schema registry request to {url} failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "Schema registry returned {} for subject {subject}",
                response.status()
            );
            return None;
        }

        match response.json::<SchemaDescriptor>().await {
            Ok(schema) => {
                tracing::debug!(
                    "Fetched schema {} v{} (id {})",
                    schema.subject,
                    schema.version,
                    schema.id
                );
                Some(schema)
            }
            Err(e) => {
                tracing::warn!("Malformed schema registry response for {subject}: {e}");
                None
            }
        }
    }
}
