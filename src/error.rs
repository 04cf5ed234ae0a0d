//! Error types for Margie
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Margie operations
///
/// Covers configuration loading, conversation bookkeeping and the round-trip
/// to the hosted chat-completion service.
#[derive(Error, Debug)]
pub enum MargieError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more required settings were never provided
    #[error("Configuration incomplete, missing: {}", .0.join(", "))]
    ConfigIncomplete(Vec<String>),

    /// A user turn had no content after trimming
    #[error("Input is empty")]
    EmptyInput,

    /// A message was rejected by the conversation store
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Provider-related errors (bad status, malformed response, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Authentication errors (401 Unauthorized, 403 Forbidden)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The hosted service throttled the request
    #[error("Rate limited by provider{}", .retry_after.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited {
        /// Seconds to wait, when the service said so
        retry_after: Option<u64>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Margie operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
