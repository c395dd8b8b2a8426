//! Trait definitions for the search engine collaborator.

mod search_engine_client;

pub use search_engine_client::{SearchEngineClient, SearchEngineConnector};
