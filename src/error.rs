//! Error taxonomy for outbound third-party calls.

use std::time::Duration;
use thiserror::Error;

/// Result type for third-party client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the client layer.
///
/// Every failure is logged once at the point of detection and then returned
/// unchanged. This layer never retries; retry and fallback policy belong to
/// the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// A provider key is not registered or its endpoint is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider answered with a 4xx status.
    #[error("client error {status}: {body}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// The provider answered with a 5xx status.
    #[error("server error {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// Connectivity failure: DNS resolution, connect refusal, TLS handshake,
    /// or an expired connect/read timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No pooled connection slot became available within the wait bound.
    #[error("connection pool exhausted after waiting {0:?}")]
    PoolTimeout(Duration),

    /// The response body does not decode into the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request body or a header could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl Error {
    /// True for connectivity-class failures, including pool exhaustion.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::PoolTimeout(_))
    }

    /// Check if this error is an expired timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::PoolTimeout(_) => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error failed while establishing a connection.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Get the HTTP status code for protocol-level failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
