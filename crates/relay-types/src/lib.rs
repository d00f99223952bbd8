//! Shared types for the kafka-relay service pair.
//!
//! Both the producer and the consumer service depend on this crate for the
//! event and validation wire shapes and for the HTTP error taxonomy.
//! Keeping them in a leaf crate means neither service depends on the other.

pub mod error;
pub mod event;
pub mod http;

pub use error::ApiError;
pub use event::{InboundEvent, SchemaInfo, SchemaValidation};
pub use http::cors_layer;

/// RFC3339 timestamp with millisecond precision.
///
/// Every response and event timestamp on the wire uses this format.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
