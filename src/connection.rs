//! Connection manager for the search engine cluster.
//!
//! This module provides the main entry point of the crate: a [`Connection`]
//! that establishes a client handle against the configured endpoints,
//! retries on failure with a fixed pause, and exposes a liveness check.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::errors::ConnectionError;
use crate::interfaces::{SearchEngineClient, SearchEngineConnector};

/// Connection manager holding the client handle for a search engine cluster.
///
/// The handle slot is either empty or holds a fully constructed handle that
/// passed a liveness probe; there is no intermediate state visible to
/// callers. The slot is guarded by a mutex so concurrent
/// `connect`/`disconnect`/`is_connected` calls are serialized; probes run on
/// a cloned handle outside the lock.
pub struct Connection {
    connector: Box<dyn SearchEngineConnector>,
    client: Mutex<Option<Arc<dyn SearchEngineClient>>>,
    config: ConnectionConfig,
}

impl Connection {
    /// Create a disconnected connection manager.
    pub fn new(connector: Box<dyn SearchEngineConnector>, config: ConnectionConfig) -> Self {
        Self {
            connector,
            client: Mutex::new(None),
            config,
        }
    }

    /// Establish a connection, retrying until the cluster is reachable.
    ///
    /// Each attempt constructs a client handle and probes it; on either
    /// failure the error is logged and the loop sleeps for the configured
    /// retry interval before trying again. The handle is installed only
    /// after a successful probe.
    ///
    /// With the default configuration this blocks the calling task until
    /// success. Set `max_connect_attempts` to bound the loop, or use
    /// [`connect_with_shutdown`](Self::connect_with_shutdown) to make it
    /// cancellable.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        // Keep the sender alive so the receiver never observes a close.
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        self.connect_with_shutdown(shutdown_rx).await
    }

    /// Establish a connection, aborting when a shutdown signal arrives.
    ///
    /// Behaves like [`connect`](Self::connect) but returns
    /// `Err(ConnectionError::Cancelled)` as soon as the receiver yields,
    /// whether during an attempt or during the pause between attempts.
    pub async fn connect_with_shutdown(
        &self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), ConnectionError> {
        let mut attempts = 0usize;

        loop {
            let result = tokio::select! {
                result = self.try_connect() => result,
                _ = shutdown_rx.recv() => {
                    warn!("Connect aborted by shutdown signal");
                    return Err(ConnectionError::Cancelled);
                }
            };

            match result {
                Ok(client) => {
                    *self.client.lock().await = Some(client);
                    info!(endpoints = ?self.config.endpoints, "Connected to search engine");
                    return Ok(());
                }
                Err(e) => {
                    attempts += 1;
                    error!(attempt = attempts, error = %e, "Failed to connect to search engine");

                    if let Some(max) = self.config.max_connect_attempts {
                        if attempts >= max {
                            return Err(ConnectionError::attempts_exhausted(
                                attempts,
                                e.to_string(),
                            ));
                        }
                    }

                    tokio::select! {
                        _ = sleep(self.config.retry_interval) => {}
                        _ = shutdown_rx.recv() => {
                            warn!("Connect aborted by shutdown signal");
                            return Err(ConnectionError::Cancelled);
                        }
                    }
                }
            }
        }
    }

    /// Drop the client handle. Idempotent; no network call.
    pub async fn disconnect(&self) {
        *self.client.lock().await = None;
    }

    /// Probe the cluster through the current handle.
    ///
    /// Returns `false` when no handle is installed or the probe fails.
    /// Never mutates the connection state.
    pub async fn is_connected(&self) -> bool {
        let client = self.client.lock().await.clone();
        match client {
            Some(client) => client.ping().await.is_ok(),
            None => false,
        }
    }

    /// Get the current client handle.
    pub async fn client(&self) -> Result<Arc<dyn SearchEngineClient>, ConnectionError> {
        self.client
            .lock()
            .await
            .clone()
            .ok_or(ConnectionError::NotConnected)
    }

    /// Single connect attempt: construct a handle, then verify it with a
    /// liveness probe.
    async fn try_connect(&self) -> Result<Arc<dyn SearchEngineClient>, ConnectionError> {
        let client = self.connector.connect(&self.config).await?;
        client.ping().await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Mock handle whose ping result tracks a shared flag.
    struct MockClient {
        ping_ok: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SearchEngineClient for MockClient {
        async fn ping(&self) -> Result<(), ConnectionError> {
            if self.ping_ok.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(ConnectionError::probe("cluster unreachable"))
            }
        }

        async fn create_index(&self, _name: &str, _settings: Value) -> Result<(), ConnectionError> {
            Ok(())
        }

        async fn delete_index(&self, _name: &str) -> Result<(), ConnectionError> {
            Ok(())
        }

        async fn index_document(
            &self,
            _index: &str,
            _id: &str,
            _document: Value,
        ) -> Result<(), ConnectionError> {
            Ok(())
        }

        async fn search(&self, _index: &str, _query: Value) -> Result<Value, ConnectionError> {
            Ok(Value::Null)
        }
    }

    /// Mock connector that fails construction a fixed number of times.
    struct MockConnector {
        construction_failures: usize,
        attempts: Arc<AtomicUsize>,
        ping_ok: Arc<AtomicBool>,
    }

    impl MockConnector {
        fn new(construction_failures: usize) -> Self {
            Self {
                construction_failures,
                attempts: Arc::new(AtomicUsize::new(0)),
                ping_ok: Arc::new(AtomicBool::new(true)),
            }
        }

        fn always_failing() -> Self {
            Self::new(usize::MAX)
        }
    }

    #[async_trait]
    impl SearchEngineConnector for MockConnector {
        async fn connect(
            &self,
            _config: &ConnectionConfig,
        ) -> Result<Arc<dyn SearchEngineClient>, ConnectionError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.construction_failures {
                return Err(ConnectionError::construction("endpoint unreachable"));
            }
            Ok(Arc::new(MockClient {
                ping_ok: self.ping_ok.clone(),
            }))
        }
    }

    fn connection_with(connector: MockConnector) -> (Connection, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let attempts = connector.attempts.clone();
        let ping_ok = connector.ping_ok.clone();
        let connection = Connection::new(
            Box::new(connector),
            ConnectionConfig::from_dsn("http://h1:9200,http://h2:9200"),
        );
        (connection, attempts, ping_ok)
    }

    #[tokio::test]
    async fn test_connect_installs_pingable_handle() {
        let (connection, attempts, _) = connection_with(MockConnector::new(0));

        connection.connect().await.unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(connection.is_connected().await);
        assert!(connection.client().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_retries_with_fixed_spacing() {
        let (connection, attempts, _) = connection_with(MockConnector::new(3));

        let started = Instant::now();
        connection.connect().await.unwrap();
        let elapsed = started.elapsed();

        // Three failed attempts mean three one-second pauses before success.
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));
        assert!(connection.is_connected().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_retries_on_probe_failure() {
        let (connection, attempts, ping_ok) = connection_with(MockConnector::new(0));
        ping_ok.store(false, Ordering::SeqCst);

        let ping_ok_clone = ping_ok.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            ping_ok_clone.store(true, Ordering::SeqCst);
        });

        connection.connect().await.unwrap();
        handle.await.unwrap();

        // Construction succeeds every round; only the probe holds it back.
        assert!(attempts.load(Ordering::SeqCst) >= 3);
        assert!(connection.client().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_bounded_attempts() {
        let connector = MockConnector::always_failing();
        let attempts = connector.attempts.clone();
        let connection = Connection::new(
            Box::new(connector),
            ConnectionConfig::from_dsn("http://h1:9200").with_max_connect_attempts(3),
        );

        let result = connection.connect().await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(ConnectionError::AttemptsExhausted { attempts: 3, .. })
        ));
        assert!(!connection.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_with_shutdown_cancels() {
        let (connection, _, _) = connection_with(MockConnector::always_failing());

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        shutdown_tx.send(()).unwrap();

        let result = connection.connect_with_shutdown(shutdown_rx).await;

        assert!(matches!(result, Err(ConnectionError::Cancelled)));
        assert!(matches!(
            connection.client().await,
            Err(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (connection, _, _) = connection_with(MockConnector::new(0));

        // Disconnecting before any connect is a no-op.
        connection.disconnect().await;

        connection.connect().await.unwrap();
        connection.disconnect().await;
        connection.disconnect().await;

        assert!(!connection.is_connected().await);
        assert!(matches!(
            connection.client().await,
            Err(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_is_connected_without_connect() {
        let (connection, _, _) = connection_with(MockConnector::new(0));

        assert!(!connection.is_connected().await);
        assert!(matches!(
            connection.client().await,
            Err(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_is_connected_tracks_cluster_state() {
        let (connection, _, ping_ok) = connection_with(MockConnector::new(0));

        connection.connect().await.unwrap();
        assert!(connection.is_connected().await);

        ping_ok.store(false, Ordering::SeqCst);
        assert!(!connection.is_connected().await);

        ping_ok.store(true, Ordering::SeqCst);
        assert!(connection.is_connected().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_blocks_until_endpoint_recovers() {
        // Both endpoints down for two rounds, then one comes back.
        let (connection, attempts, ping_ok) = connection_with(MockConnector::new(2));

        let started = Instant::now();
        connection.connect().await.unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(connection.is_connected().await);

        // Endpoint goes down again after the handle is bound.
        ping_ok.store(false, Ordering::SeqCst);
        assert!(!connection.is_connected().await);
    }
}
