//! OpenSearch implementation of the search engine client.
//!
//! This module provides concrete implementations of `SearchEngineClient`
//! and `SearchEngineConnector` using the OpenSearch Rust client.

mod client;
mod request_logger;

pub use client::{OpenSearchClient, OpenSearchConnector};
pub use request_logger::RequestLogger;
