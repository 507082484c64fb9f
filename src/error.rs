//! Error types for Pair Sentinel

use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Validation error (bad address, out-of-range policy value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Failure to obtain a report from an external data source.
///
/// Never escapes the evaluator: every variant is mapped to an absent report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection or transport failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Request exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// Non-2xx HTTP status
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The service has no data for this address
    #[error("no data for address")]
    NotFound,
}

impl FetchError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Timeout => "timeout",
            FetchError::Status(_) => "status",
            FetchError::Malformed(_) => "malformed",
            FetchError::NotFound => "not_found",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
