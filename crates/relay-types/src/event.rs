//! Event types shared between the services and the dashboard.
//!
//! Field names are camelCase on the wire because the dashboard matches on
//! them; `parseError` and `key` are omitted (not null) when absent, while
//! `schemaValidation` is an explicit null when no outcome was attached.

use serde::Serialize;

/// Schema identity reported back to clients after a registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    pub subject: String,
    pub version: i32,
    pub id: i32,
}

/// Outcome of validating a decoded record against the user schema.
///
/// Serialized shapes:
/// - valid:   `{"valid":true,"schema":{"subject":..,"version":..,"id":..}}`
/// - invalid: `{"valid":false,"error":"..","schema":"user-value"}`
///
/// The `schema` field carries the full identity on success but only the
/// subject name on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SchemaValidation {
    Valid { valid: bool, schema: SchemaInfo },
    Invalid { valid: bool, error: String, schema: String },
}

impl SchemaValidation {
    pub fn valid(schema: SchemaInfo) -> Self {
        Self::Valid {
            valid: true,
            schema,
        }
    }

    pub fn invalid(error: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::Invalid {
            valid: false,
            error: error.into(),
            schema: subject.into(),
        }
    }
}

/// A record delivered by the broker, decoded and annotated for fan-out.
///
/// Exists only for the duration of a single broadcast; nothing is
/// persisted by the relay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub topic: String,
    pub partition: i32,
    /// Broker-assigned offset, monotonic per partition.
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Decoded JSON body, or the raw text when decoding failed.
    pub value: serde_json::Value,
    /// Receipt timestamp (RFC3339).
    pub timestamp: String,
    /// Validation outcome; null when the topic is not schema-governed or
    /// the registry was unreachable.
    pub schema_validation: Option<SchemaValidation>,
    pub is_json: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}
