//! Error types for HastaIO

use crate::protocol::ParseError;
use crate::transport::TransportError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// HastaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed wire line
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Line source failure (closed, timeout, disconnect, socket error)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Invalid configuration, raised at construction time
    #[error("Configuration error: {0}")]
    Config(String),

    /// Consumer callback failed during stream processing
    #[error("Callback failed during stream processing: {0}")]
    Callback(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
