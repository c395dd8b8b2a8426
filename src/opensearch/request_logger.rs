//! Request logging shim.
//!
//! Captures outbound request bodies and their round-trip duration. Only
//! request bodies are ever logged; responses and errors pass through
//! untouched.

use std::time::Duration;

use serde_json::Value;
use tracing::info;

/// Logs outbound request bodies with round-trip timing.
///
/// Stateless and safe for concurrent use. Emits one info-level line per
/// request that carries a body; requests without a body produce nothing.
/// The emit path has no error channel, so logging can never fail a request.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl RequestLogger {
    /// Create a new request logger.
    pub fn new() -> Self {
        Self
    }

    /// Record one round trip.
    ///
    /// Emits an info line with the elapsed milliseconds and the body text
    /// when a body is present. Returns whether an entry was emitted.
    pub fn log_round_trip(&self, body: Option<&Value>, duration: Duration) -> bool {
        match body {
            Some(body) => {
                info!("{}", Self::format_entry(duration, body));
                true
            }
            None => false,
        }
    }

    /// Request bodies are always captured.
    pub fn request_body_enabled(&self) -> bool {
        true
    }

    /// Response bodies are never captured.
    pub fn response_body_enabled(&self) -> bool {
        false
    }

    fn format_entry(duration: Duration, body: &Value) -> String {
        format!("[{} ms] {}", duration.as_millis(), body)
    }
}
