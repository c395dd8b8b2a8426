//! Connection error types.
//!
//! This module defines the error types that can occur while establishing or
//! using a connection to the search engine.

use thiserror::Error;

/// Errors that can occur during connection management.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    /// Failed to construct the client (e.g., malformed endpoint list,
    /// transport setup failure).
    #[error("Construction error: {0}")]
    ConstructionError(String),

    /// Liveness probe against the cluster failed.
    #[error("Probe error: {0}")]
    ProbeError(String),

    /// A request issued through the client handle failed.
    #[error("Request error: {0}")]
    RequestError(String),

    /// No client handle is installed.
    #[error("Not connected")]
    NotConnected,

    /// Connect loop was aborted by a shutdown signal.
    #[error("Connect cancelled by shutdown signal")]
    Cancelled,

    /// Connect gave up after the configured number of attempts.
    #[error("Connect failed after {attempts} attempts: {last_error}")]
    AttemptsExhausted { attempts: usize, last_error: String },
}

impl ConnectionError {
    /// Create a construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::ConstructionError(msg.into())
    }

    /// Create a probe error.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::ProbeError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create an attempts-exhausted error.
    pub fn attempts_exhausted(attempts: usize, last_error: impl Into<String>) -> Self {
        Self::AttemptsExhausted {
            attempts,
            last_error: last_error.into(),
        }
    }
}
