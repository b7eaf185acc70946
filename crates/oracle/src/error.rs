//! Error types for the real-time price oracle client.

use thiserror::Error;

/// Errors that can occur when fetching real-time prices.
///
/// Downstream these are all equivalent to "price unverifiable": the
/// validation gate downgrades every variant to a warning.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle throttled us.
    #[error("rate limited by prices API")]
    RateLimited,

    /// API request failed.
    #[error("prices API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error message from the API.
        message: String,
    },

    /// No recent trading activity recorded for the item.
    #[error("no recent trading activity for item {item_id}")]
    NoData {
        /// The item that had no price data.
        item_id: i32,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Response body did not match the expected shape.
    #[error("malformed price response: {0}")]
    Malformed(String),
}

impl OracleError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a no-data error for an item.
    #[must_use]
    pub fn no_data(item_id: i32) -> Self {
        Self::NoData { item_id }
    }

    /// Returns true if a later retry could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            Self::NoData { .. } | Self::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
