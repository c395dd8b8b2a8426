//! # Search Connection
//!
//! Connection lifecycle management for a search engine cluster.
//!
//! This crate establishes a client handle against one or more cluster
//! endpoints, retries on failure with a fixed pause, exposes a liveness
//! check, and optionally logs outbound request bodies with round-trip
//! timing. It includes definitions for errors, interfaces, and a concrete
//! implementation for OpenSearch.

pub mod config;
pub mod connection;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use errors::ConnectionError;
pub use interfaces::{SearchEngineClient, SearchEngineConnector};
pub use opensearch::{OpenSearchClient, OpenSearchConnector};
