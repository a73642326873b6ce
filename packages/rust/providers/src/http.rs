//! HTTP client construction and failure classification shared by all providers.

use std::time::Duration;

use cityscout_shared::{CityScoutError, FailureKind, ProviderError, Result};
use reqwest::{Client, StatusCode};
use url::Url;

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("CityScout/", env!("CARGO_PKG_VERSION"));

/// Longest upstream body excerpt kept in a failure message.
const MAX_BODY_EXCERPT: usize = 200;

/// Build a reqwest client with the given per-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CityScoutError::Network(format!("failed to build HTTP client: {e}")))
}

/// Join `path` onto `base`, tolerating a trailing slash (or its absence) on the base.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url> {
    let base = format!("{}/", base.trim_end_matches('/'));
    Url::parse(&base)
        .and_then(|url| url.join(path.trim_start_matches('/')))
        .map_err(|e| CityScoutError::config(format!("invalid endpoint {base}{path}: {e}")))
}

/// Classify a transport-level reqwest error.
pub(crate) fn classify_transport(err: &reqwest::Error) -> ProviderError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_decode() {
        FailureKind::Malformed
    } else if let Some(status) = err.status() {
        classify_status_code(status)
    } else {
        FailureKind::Unreachable
    };
    ProviderError::new(kind, err.to_string())
}

/// Classify a non-success HTTP response by status code and upstream body.
///
/// On 4xx responses, quota and missing-model conditions are also recognized
/// by the Google-style `RESOURCE_EXHAUSTED` / `NOT_FOUND` status strings in
/// the body. Server errors are classified by code alone.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let kind = match status.is_client_error() {
        true if body.contains("RESOURCE_EXHAUSTED") => FailureKind::QuotaExceeded,
        true if body.contains("NOT_FOUND") => FailureKind::ModelNotFound,
        _ => classify_status_code(status),
    };
    ProviderError::new(kind, format!("HTTP {status}: {}", excerpt(body)))
}

fn classify_status_code(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::TOO_MANY_REQUESTS => FailureKind::QuotaExceeded,
        StatusCode::NOT_FOUND => FailureKind::ModelNotFound,
        other => FailureKind::HttpStatus(other.as_u16()),
    }
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_with_or_without_slash() {
        let a = endpoint("https://api.pexels.com", "v1/search").unwrap();
        let b = endpoint("https://api.pexels.com/", "/v1/search").unwrap();
        assert_eq!(a.as_str(), "https://api.pexels.com/v1/search");
        assert_eq!(a, b);
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = endpoint("http://localhost:8080/proxy", "v4/weather/forecast").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/v4/weather/forecast");
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(endpoint("not a url", "v1/search").is_err());
    }

    #[test]
    fn status_classification() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err.kind, FailureKind::QuotaExceeded);

        let err = classify_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.kind, FailureKind::ModelNotFound);

        let err = classify_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.kind, FailureKind::HttpStatus(502));
        assert!(err.message.contains("upstream down"));
    }

    #[test]
    fn body_status_strings_win_over_code() {
        let body = r#"{"error":{"code":400,"status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, FailureKind::QuotaExceeded);

        let body = r#"{"error":{"status":"NOT_FOUND","message":"models/x is not found"}}"#;
        let err = classify_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, FailureKind::ModelNotFound);
    }

    #[test]
    fn server_errors_ignore_body_status_strings() {
        let body = r#"{"error":"upstream NOT_FOUND while proxying"}"#;
        let err = classify_status(StatusCode::BAD_GATEWAY, body);
        assert_eq!(err.kind, FailureKind::HttpStatus(502));

        let err = classify_status(StatusCode::SERVICE_UNAVAILABLE, "RESOURCE_EXHAUSTED");
        assert_eq!(err.kind, FailureKind::HttpStatus(503));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.message.len() < 300);
    }
}
