//! Error types for ddns6.

use thiserror::Error;

/// Result type alias for ddns6.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// DDNS error types.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Configuration error (fatal at startup).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Provider API error.
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    /// No zone matched the configured domain (fatal at startup).
    #[error("No zone found for domain {0}")]
    ZoneNotFound(String),

    /// The watched interface does not exist.
    #[error("Interface {0} not found")]
    InterfaceNotFound(String),

    /// The watched interface is administratively down.
    #[error("Interface {0} is down")]
    InterfaceDown(String),

    /// The interface carries no qualifying global public IPv6 address.
    #[error("No global public IPv6 address on {0}")]
    NoPublicAddress(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        DdnsError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for DdnsError {
    fn from(e: serde_json::Error) -> Self {
        DdnsError::Serialization(e.to_string())
    }
}
