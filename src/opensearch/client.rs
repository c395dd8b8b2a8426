//! OpenSearch client implementation.
//!
//! This module provides the concrete connector and client handle built on
//! the OpenSearch Rust client.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use opensearch::http::response::Response;
use opensearch::http::transport::{
    MultiNodeConnectionPool, SingleNodeConnectionPool, TransportBuilder,
};
use opensearch::indices::{IndicesCreateParts, IndicesDeleteParts};
use opensearch::{IndexParts, OpenSearch, SearchParts};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::ConnectionError;
use crate::interfaces::{SearchEngineClient, SearchEngineConnector};
use crate::opensearch::request_logger::RequestLogger;

/// Connector that builds [`OpenSearchClient`] handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSearchConnector;

impl OpenSearchConnector {
    /// Create a new connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchEngineConnector for OpenSearchConnector {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn SearchEngineClient>, ConnectionError> {
        let client = OpenSearchClient::new(config)?;
        Ok(Arc::new(client))
    }
}

/// OpenSearch implementation of the client handle.
///
/// # Example
///
/// ```ignore
/// use search_connection::{Connection, ConnectionConfig, OpenSearchConnector};
///
/// let config = ConnectionConfig::from_dsn("http://h1:9200,http://h2:9200");
/// let connection = Connection::new(Box::new(OpenSearchConnector::new()), config);
/// connection.connect().await?;
/// assert!(connection.is_connected().await);
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    max_retries: u32,
    retry_on_timeout: bool,
    request_logger: Option<RequestLogger>,
}

impl OpenSearchClient {
    /// Build a client for the configured endpoints.
    ///
    /// A single endpoint uses a single-node pool; multiple endpoints are
    /// balanced round-robin. The per-request timeout and the request logger
    /// are attached here when configured.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client handle
    /// * `Err(ConnectionError)` - If an endpoint is malformed or transport setup fails
    pub fn new(config: &ConnectionConfig) -> Result<Self, ConnectionError> {
        let mut urls = Vec::with_capacity(config.endpoints.len());
        for endpoint in &config.endpoints {
            let url = Url::parse(endpoint).map_err(|e| {
                ConnectionError::construction(format!("invalid endpoint {}: {}", endpoint, e))
            })?;
            urls.push(url);
        }

        if urls.is_empty() {
            return Err(ConnectionError::construction("no endpoints configured"));
        }

        let mut builder = if urls.len() == 1 {
            TransportBuilder::new(SingleNodeConnectionPool::new(urls.remove(0)))
        } else {
            TransportBuilder::new(MultiNodeConnectionPool::round_robin(urls, None))
        }
        .disable_proxy();

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let transport = builder
            .build()
            .map_err(|e| ConnectionError::construction(e.to_string()))?;

        info!(endpoints = ?config.endpoints, "Created OpenSearch client");

        Ok(Self {
            client: OpenSearch::new(transport),
            max_retries: config.max_retries,
            retry_on_timeout: config.retry_on_timeout,
            request_logger: config.log_requests.then(RequestLogger::new),
        })
    }

    /// Send one request, retrying on timeout up to `max_retries` times, and
    /// report the round trip to the request logger when one is attached.
    async fn execute<F, Fut>(
        &self,
        body: Option<&Value>,
        send: F,
    ) -> Result<Response, opensearch::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Response, opensearch::Error>>,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        let result = loop {
            match send().await {
                Ok(response) => break Ok(response),
                Err(e) if self.retry_on_timeout && e.is_timeout() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Request timed out, retrying");
                }
                Err(e) => break Err(e),
            }
        };

        if let Some(logger) = &self.request_logger {
            logger.log_round_trip(body, started.elapsed());
        }

        result
    }

    /// Surface non-success responses as request errors with the body text.
    async fn check_status(response: Response, operation: &str) -> Result<Response, ConnectionError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, operation, "Request failed");
            return Err(ConnectionError::request(format!(
                "{} failed with status {}: {}",
                operation, status, error_body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    async fn ping(&self) -> Result<(), ConnectionError> {
        let response = self
            .execute(None, || self.client.ping().send())
            .await
            .map_err(|e| ConnectionError::probe(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(ConnectionError::probe(format!(
                "ping returned status {}",
                status
            )));
        }
        Ok(())
    }

    async fn create_index(&self, name: &str, settings: Value) -> Result<(), ConnectionError> {
        let response = self
            .execute(Some(&settings), || {
                let indices = self.client.indices();
                let body = settings.clone();
                async move {
                    indices
                        .create(IndicesCreateParts::Index(name))
                        .body(body)
                        .send()
                        .await
                }
            })
            .await
            .map_err(|e| ConnectionError::request(e.to_string()))?;

        Self::check_status(response, "index create").await?;
        debug!(index = name, "Index created");
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<(), ConnectionError> {
        let indices = [name];
        let response = self
            .execute(None, || {
                let namespace = self.client.indices();
                let indices = &indices;
                async move {
                    namespace
                        .delete(IndicesDeleteParts::Index(indices))
                        .send()
                        .await
                }
            })
            .await
            .map_err(|e| ConnectionError::request(e.to_string()))?;

        Self::check_status(response, "index delete").await?;
        debug!(index = name, "Index deleted");
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: Value,
    ) -> Result<(), ConnectionError> {
        let response = self
            .execute(Some(&document), || {
                self.client
                    .index(IndexParts::IndexId(index, id))
                    .body(document.clone())
                    .send()
            })
            .await
            .map_err(|e| ConnectionError::request(e.to_string()))?;

        Self::check_status(response, "document index").await?;
        debug!(index, doc_id = id, "Document indexed");
        Ok(())
    }

    async fn search(&self, index: &str, query: Value) -> Result<Value, ConnectionError> {
        let indices = [index];
        let response = self
            .execute(Some(&query), || {
                self.client
                    .search(SearchParts::Index(&indices))
                    .body(query.clone())
                    .send()
            })
            .await
            .map_err(|e| ConnectionError::request(e.to_string()))?;

        let response = Self::check_status(response, "search").await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ConnectionError::request(e.to_string()))
    }
}
