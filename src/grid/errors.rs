//! Grid-specific error types

use thiserror::Error;

/// Errors that can occur in grid trading operations
#[derive(Error, Debug, Clone)]
pub enum GridError {
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error("Price unavailable for {0}: all sources failed")]
    PriceUnavailable(String),

    #[error("Trade rejected in wallet")]
    TradeRejectedByUser,

    #[error("Trade execution failed: {0}")]
    TradeExecution(String),

    #[error("Route builder error ({provider}): {reason}")]
    RouteBuilder { provider: String, reason: String },

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Engine is in invalid state for operation: {current_state}")]
    InvalidState { current_state: String },

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("No route builder registered for provider: {0}")]
    UnknownRouteProvider(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// Whether the failure came from the user declining to sign
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, GridError::TradeRejectedByUser)
    }
}

impl From<reqwest::Error> for GridError {
    fn from(err: reqwest::Error) -> Self {
        GridError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::JsonParse(err.to_string())
    }
}

impl From<config::ConfigError> for GridError {
    fn from(err: config::ConfigError) -> Self {
        GridError::Config(err.to_string())
    }
}

impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        GridError::Config(err.to_string())
    }
}

/// Result type for grid operations
pub type GridResult<T> = std::result::Result<T, GridError>;
