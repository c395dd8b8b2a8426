//! Search engine client trait definitions.
//!
//! This module defines the abstract interface the connection manager needs
//! from the underlying client library, allowing for different backend
//! implementations (OpenSearch, Elasticsearch, etc.) and for mocks in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::errors::ConnectionError;

/// A constructed client handle for a search engine cluster.
///
/// The connection manager only needs the liveness probe; the remaining
/// operations let application code drive the cluster through the same
/// handle. Document and query bodies are opaque JSON.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Issue a liveness probe against the cluster.
    ///
    /// Returns `Ok(())` iff the cluster is reachable and responsive.
    async fn ping(&self) -> Result<(), ConnectionError>;

    /// Create an index with the given settings and mappings.
    async fn create_index(&self, name: &str, settings: Value) -> Result<(), ConnectionError>;

    /// Delete an index. Deleting a missing index is an error surfaced by
    /// the backend, not by this layer.
    async fn delete_index(&self, name: &str) -> Result<(), ConnectionError>;

    /// Index a document under the given id.
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: Value,
    ) -> Result<(), ConnectionError>;

    /// Run a search query and return the raw response body.
    async fn search(&self, index: &str, query: Value) -> Result<Value, ConnectionError>;
}

/// Constructs client handles from a configuration.
///
/// This is the `{construct(config) -> handle | error}` capability of the
/// client library; the connection manager owns the retry policy around it.
#[async_trait]
pub trait SearchEngineConnector: Send + Sync {
    /// Build a client handle for the configured endpoints.
    ///
    /// A returned handle is fully constructed but not yet verified; the
    /// connection manager probes it before installing it.
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn SearchEngineClient>, ConnectionError>;
}
