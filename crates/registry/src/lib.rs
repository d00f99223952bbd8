//! Schema Registry access and message validation.
//!
//! The registry is Confluent-compatible: schemas live under versioned
//! subjects and the latest version is fetched with
//! `GET /subjects/{subject}/versions/latest`. Nothing is cached — every
//! lookup is a fresh fetch, so registry-side schema updates take effect on
//! the next message.
//!
//! The two call sites treat a failed lookup differently, and both behaviors
//! are deliberate:
//! - the publish path soft-fails (sends the message unvalidated),
//! - the explicit validate endpoint hard-fails with a 404.

pub mod client;
pub mod validator;

pub use client::{RegistryClient, SchemaDescriptor};
pub use validator::{handle_validate_message, validate_user_message, ValidationError};
