//! Configuration for the connection manager.
//!
//! A single configuration struct replaces the pair of connect variants the
//! manager would otherwise need: transport knobs are optional and carry
//! documented defaults.

use std::env;
use std::time::Duration;

/// Default DSN when none is configured.
const DEFAULT_SEARCH_DSN: &str = "http://localhost:9200";

/// Environment variable holding the cluster DSN.
const ENV_SEARCH_DSN: &str = "SEARCH_DSN";

/// Environment variable toggling request-body logging.
const ENV_SEARCH_LOG_REQUESTS: &str = "SEARCH_LOG_REQUESTS";

/// Configuration for a [`Connection`](crate::Connection).
///
/// The endpoint list comes from a DSN: a comma-separated list of base URLs,
/// e.g. `http://host1:9200,http://host2:9200`. The list is kept in order,
/// without deduplication or validation; endpoint parsing is the client
/// library's concern at construction time.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Ordered cluster endpoints.
    pub endpoints: Vec<String>,
    /// Per-request timeout. None uses the client library default.
    pub request_timeout: Option<Duration>,
    /// How many times a single request is retried on timeout.
    pub max_retries: u32,
    /// Whether timed-out requests are retried at all.
    pub retry_on_timeout: bool,
    /// Pause between connect attempts.
    pub retry_interval: Duration,
    /// Upper bound on connect attempts. None retries until success.
    pub max_connect_attempts: Option<usize>,
    /// Whether outbound request bodies are logged with timing.
    pub log_requests: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_SEARCH_DSN.to_string()],
            request_timeout: None,
            max_retries: 3,
            retry_on_timeout: true,
            retry_interval: Duration::from_secs(1),
            max_connect_attempts: None,
            log_requests: false,
        }
    }
}

impl ConnectionConfig {
    /// Create a config from a DSN.
    ///
    /// The DSN is split on commas into the ordered endpoint list. No
    /// trimming or deduplication is applied.
    pub fn from_dsn(dsn: &str) -> Self {
        Self {
            endpoints: dsn.split(',').map(str::to_string).collect(),
            ..Self::default()
        }
    }

    /// Create a config from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_DSN`: comma-separated endpoint list (default: http://localhost:9200)
    /// - `SEARCH_LOG_REQUESTS`: set to `1` or `true` to log request bodies
    pub fn from_env() -> Self {
        let dsn = env::var(ENV_SEARCH_DSN).unwrap_or_else(|_| DEFAULT_SEARCH_DSN.to_string());
        let log_requests = env::var(ENV_SEARCH_LOG_REQUESTS)
            .map(|v| matches!(v.as_str(), "1" | "true"))
            .unwrap_or(false);

        Self {
            log_requests,
            ..Self::from_dsn(&dsn)
        }
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the per-request retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the pause between connect attempts.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Bound the number of connect attempts.
    pub fn with_max_connect_attempts(mut self, attempts: usize) -> Self {
        self.max_connect_attempts = Some(attempts);
        self
    }

    /// Enable or disable request-body logging.
    pub fn with_log_requests(mut self, log_requests: bool) -> Self {
        self.log_requests = log_requests;
        self
    }
}
