use thiserror::Error;

/// Main error type for the aggregator
#[derive(Error, Debug)]
pub enum HuddleError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Upstream platform errors
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data inconsistency: {0}")]
    DataInconsistency(String),

    // Persistence errors (ledger, feed flags)
    #[error("Persistence failure: {0}")]
    Persistence(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for HuddleError
pub type Result<T> = std::result::Result<T, HuddleError>;
