// src/error.rs
//! Application error types with structured error handling.
//!
//! Two families live here. `AppError` is the vocabulary for failures that
//! abort an operation (bad configuration, an unusable store, a crashed
//! worker). `FetchFailure` is not an abort at all: it is the value a page
//! request hands back when the OSF API refuses it, and callers branch on it
//! to stop one pagination branch while keeping everything gathered so far.

use std::fmt;
use thiserror::Error;

/// A page request that did not produce a usable page.
///
/// Carries enough context to log the failure the way an operator expects:
/// which URL, what status (absent for transport-level failures), and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub status: Option<u16>,
    pub reason: String,
}

impl FetchFailure {
    /// A non-success HTTP response.
    pub fn http(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            url: url.into(),
            status: Some(status.as_u16()),
            reason: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }

    /// The request never produced a response (DNS, TLS, connection reset).
    pub fn transport(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Self {
            url: url.into(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    /// A success response whose body could not be read as the expected document.
    pub fn malformed(url: impl Into<String>, status: u16, cause: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            reason: format!("malformed response body: {}", cause),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{}: {} - {}", self.url, status, self.reason),
            None => write!(f, "{}: {}", self.url, self.reason),
        }
    }
}

impl std::error::Error for FetchFailure {}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError {
            message: format!(
                "Collection worker task failed with join error: {}. This may indicate a panic in the worker.",
                err
            ),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_uses_canonical_reason() {
        let failure = FetchFailure::http(
            "https://api.osf.io/v2/users/abc12/nodes/?page=3",
            reqwest::StatusCode::BAD_GATEWAY,
        );
        assert_eq!(failure.status, Some(502));
        assert_eq!(failure.reason, "Bad Gateway");
        assert_eq!(
            failure.to_string(),
            "https://api.osf.io/v2/users/abc12/nodes/?page=3: 502 - Bad Gateway"
        );
    }

    #[test]
    fn malformed_failure_keeps_status() {
        let failure = FetchFailure::malformed("u", 200, "expected value at line 1");
        assert_eq!(failure.status, Some(200));
        assert!(failure.reason.starts_with("malformed response body"));
    }
}
