//! Error types for Watch Relay.

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Feed-fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Feed request failed: {reason}")]
    Unreachable { reason: String },

    #[error("Feed returned HTTP {status}")]
    Status { status: u16 },
}

/// Transport-related errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{method} request failed: {reason}")]
    RequestFailed { method: String, reason: String },

    #[error("{method} rejected by API: {reason}")]
    Rejected { method: String, reason: String },
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
