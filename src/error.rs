//! Error types for the project client.

use thiserror::Error;

use crate::sdk::types::HeaderKind;

/// Result type alias for project client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the project client.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Session Errors =====
    #[error(
        "Missing required authentication parameters: access_token or service_acct and service_secret"
    )]
    MissingCredentials,

    #[error("Missing required project id")]
    MissingProjectId,

    #[error("Missing auth value: no authorization header could be derived")]
    MissingAuthValue,

    #[error("Could not find {} headers", .0.as_ref().map(|k| k.as_str()).unwrap_or("any"))]
    HeadersNotFound(Option<HeaderKind>),

    #[error("Invalid region: {0} (expected US or EU)")]
    InvalidRegion(String),

    // ===== Upstream Errors =====
    #[error("Upstream request failed: {method} {url}{} - {message}", .status.as_ref().map(|s| format!(" ({})", s)).unwrap_or_default())]
    UpstreamRequestFailed {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
    },

    // ===== Serialization Errors =====
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an upstream error from request and response details.
    pub fn upstream(
        method: impl Into<String>,
        url: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::UpstreamRequestFailed {
            method: method.into(),
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// HTTP status of an upstream failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamRequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this error originated on the remote side of the wire.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamRequestFailed { .. })
    }
}
