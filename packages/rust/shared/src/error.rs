//! Error types for CityScout.
//!
//! Library crates use [`CityScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! External-service adapters never surface [`CityScoutError`]; they report a
//! [`ProviderError`] classified by [`FailureKind`] and substitute a fallback.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for all CityScout operations.
#[derive(Debug, thiserror::Error)]
pub enum CityScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP setup error (client construction, invalid endpoint).
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (e.g. an empty city name).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CityScoutError>;

impl CityScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider failures
// ---------------------------------------------------------------------------

/// Why a single external-service attempt did not yield a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum FailureKind {
    /// The credential for the service is not configured.
    MissingCredential,
    /// The upstream reported quota/rate exhaustion (HTTP 429).
    QuotaExceeded,
    /// The requested model does not exist (HTTP 404).
    ModelNotFound,
    /// The request exceeded its timeout.
    Timeout,
    /// Connection-level failure (DNS, refused, TLS, ...).
    Unreachable,
    /// Any other non-success HTTP status.
    HttpStatus(u16),
    /// The body could not be decoded into the expected shape.
    Malformed,
    /// The upstream answered successfully but with nothing usable.
    Empty,
}

impl FailureKind {
    /// Whether this failure means "try the next candidate in the list"
    /// rather than "the service itself is unavailable".
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::QuotaExceeded | Self::ModelNotFound)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing credential"),
            Self::QuotaExceeded => write!(f, "quota exceeded"),
            Self::ModelNotFound => write!(f, "model not found"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::HttpStatus(code) => write!(f, "HTTP {code}"),
            Self::Malformed => write!(f, "malformed response"),
            Self::Empty => write!(f, "empty response"),
        }
    }
}

/// A classified failure from one external-service call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: FailureKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credential(var_name: &str) -> Self {
        Self::new(
            FailureKind::MissingCredential,
            format!("{var_name} is not set"),
        )
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(FailureKind::Malformed, msg)
    }

    pub fn empty(msg: impl Into<String>) -> Self {
        Self::new(FailureKind::Empty, msg)
    }
}

/// One failed attempt inside a fallback chain: which candidate was tried
/// (model id, search term, service name) and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub attempt: String,
    pub error: ProviderError,
}

impl Failure {
    pub fn new(attempt: impl Into<String>, error: ProviderError) -> Self {
        Self {
            attempt: attempt.into(),
            error,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.attempt, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CityScoutError::config("missing base URL");
        assert_eq!(err.to_string(), "config error: missing base URL");

        let err = CityScoutError::validation("city name must not be empty");
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::new(FailureKind::HttpStatus(503), "service unavailable");
        assert_eq!(err.to_string(), "HTTP 503: service unavailable");

        let err = ProviderError::missing_credential("PEXELS_API_KEY");
        assert_eq!(err.to_string(), "missing credential: PEXELS_API_KEY is not set");
    }

    #[test]
    fn exhaustion_kinds() {
        assert!(FailureKind::QuotaExceeded.is_exhaustion());
        assert!(FailureKind::ModelNotFound.is_exhaustion());
        assert!(!FailureKind::Timeout.is_exhaustion());
        assert!(!FailureKind::HttpStatus(500).is_exhaustion());
    }

    #[test]
    fn failure_kind_serializes_with_status() {
        let json = serde_json::to_string(&FailureKind::HttpStatus(502)).unwrap();
        assert_eq!(json, r#"{"kind":"http_status","status":502}"#);

        let json = serde_json::to_string(&FailureKind::Timeout).unwrap();
        assert_eq!(json, r#"{"kind":"timeout"}"#);
    }
}
