//! Field-level validation of user messages.
//!
//! The rule set is fixed: it mirrors the deployed `user-value` subject
//! (v1 requires `name` and `age`, v2 added the optional `email`). The
//! fetched descriptor's own schema payload is not interpreted — the
//! registry lookup supplies identity (subject/version/id) for reporting
//! only. Rules are evaluated in order and the first violation wins.
//!
//! The error strings surface verbatim in API responses and events, so they
//! are part of the wire contract and are kept as-is.

use relay_types::ApiError;
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::RegistryClient;

/// A schema rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Поле name должно быть строкой")]
    Name,
    #[error("Поле age должно быть положительным числом")]
    Age,
    #[error("Поле email должно быть строкой или null")]
    Email,
}

/// Validate a decoded message against the user schema rules.
///
/// - `name`: required, non-empty string
/// - `age`: required, number >= 0
/// - `email`: optional, but must be a string when present
///
/// Any other fields pass through unvalidated.
pub fn validate_user_message(message: &Value) -> Result<(), ValidationError> {
    match message.get("name") {
        Some(Value::String(name)) if !name.is_empty() => {}
        _ => return Err(ValidationError::Name),
    }

    match message.get("age") {
        Some(Value::Number(age)) if age.as_f64().is_some_and(|a| a >= 0.0) => {}
        _ => return Err(ValidationError::Age),
    }

    match message.get("email") {
        None | Some(Value::String(_)) => {}
        _ => return Err(ValidationError::Email),
    }

    Ok(())
}

/// Endpoint body shared by both services' `POST /validate-message`.
///
/// A missing schema is a hard 404 here, unlike the publish path where it
/// soft-fails; the asymmetry is intentional and preserved.
pub async fn handle_validate_message(
    client: &RegistryClient,
    subject: &str,
    message: &Value,
) -> Result<Value, ApiError> {
    let Some(schema) = client.fetch_latest(subject).await else {
        return Err(ApiError::not_found(json!({
            "error": "Schema not found",
            "schemaSubject": subject,
        })));
    };

    let schema_info = json!({
        "subject": schema.subject,
        "version": schema.version,
        "id": schema.id,
    });

    match validate_user_message(message) {
        Ok(()) => Ok(json!({
            "success": true,
            "message": "Message is valid",
            "schema": schema_info,
            "validatedMessage": message,
        })),
        Err(e) => Err(ApiError::bad_request_body(json!({
            "success": false,
            "error": "Validation failed",
            "details": e.to_string(),
            "schema": schema_info,
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_message() {
        let message = json!({"name": "Ann", "age": 30});
        assert_eq!(validate_user_message(&message), Ok(()));
    }

    #[test]
    fn test_valid_message_with_email_and_extra_fields() {
        let message = json!({
            "name": "Ann",
            "age": 30,
            "email": "ann@example.com",
            "anything": {"nested": true},
        });
        assert_eq!(validate_user_message(&message), Ok(()));
    }

    #[test]
    fn test_missing_name_rejected_regardless_of_other_fields() {
        let message = json!({"age": 30, "email": "ann@example.com"});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Name));
    }

    #[test]
    fn test_non_string_name_rejected() {
        let message = json!({"name": 42, "age": 30});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Name));
    }

    #[test]
    fn test_empty_name_rejected() {
        let message = json!({"name": "", "age": 30});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Name));
    }

    #[test]
    fn test_name_failure_wins_over_age_failure() {
        // first missing field short-circuits
        let message = json!({"email": 7});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Name));
    }

    #[test]
    fn test_missing_age_rejected() {
        let message = json!({"name": "Ann"});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Age));
    }

    #[test]
    fn test_negative_age_rejected() {
        let message = json!({"name": "Ann", "age": -1});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Age));
    }

    #[test]
    fn test_non_numeric_age_rejected() {
        let message = json!({"name": "Ann", "age": "30"});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Age));
    }

    #[test]
    fn test_zero_age_accepted() {
        let message = json!({"name": "Ann", "age": 0});
        assert_eq!(validate_user_message(&message), Ok(()));
    }

    #[test]
    fn test_fractional_age_accepted() {
        let message = json!({"name": "Ann", "age": 30.5});
        assert_eq!(validate_user_message(&message), Ok(()));
    }

    #[test]
    fn test_non_string_email_rejected() {
        let message = json!({"name": "Ann", "age": 30, "email": 5});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Email));
    }

    #[test]
    fn test_null_email_rejected() {
        // An explicit null is "present and not a string"
        let message = json!({"name": "Ann", "age": 30, "email": null});
        assert_eq!(validate_user_message(&message), Err(ValidationError::Email));
    }

    #[test]
    fn test_error_messages_are_wire_contract() {
        assert_eq!(
            ValidationError::Name.to_string(),
            "Поле name должно быть строкой"
        );
        assert_eq!(
            ValidationError::Age.to_string(),
            "Поле age должно быть положительным числом"
        );
        assert_eq!(
            ValidationError::Email.to_string(),
            "Поле email должно быть строкой или null"
        );
    }
}
