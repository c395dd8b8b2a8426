//! Error types for the connection manager.

mod connection_error;

pub use connection_error::ConnectionError;
