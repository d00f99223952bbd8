//! HTTP middleware plumbing shared by both services.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer from the configured origin list.
///
/// A lone `*` entry allows any origin; otherwise the listed origins are
/// parsed and allowed explicitly. An unparseable origin is a configuration
/// error and fails service startup.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    }

    let parsed = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_origin_list() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:3002".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_wildcard_origin() {
        assert!(cors_layer(&["*".to_string()]).is_ok());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(cors_layer(&["not a header\nvalue".to_string()]).is_err());
    }
}
