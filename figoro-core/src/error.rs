//! Error types for figoro.

use thiserror::Error;

/// Errors that can occur while resolving accounts and aggregating their events.
#[derive(Error, Debug)]
pub enum FigoroError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Account '{0}' does not exist in config")]
    AccountNotFound(String),

    #[error("Account '{0}' already exists in config")]
    AccountExists(String),

    #[error("Invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("Failed to resolve calendars for account '{account}': {source}")]
    Enumeration {
        account: String,
        #[source]
        source: Box<FigoroError>,
    },

    #[error("Failed to fetch events from '{calendar}' ({account}): {reason}")]
    Fetch {
        account: String,
        calendar: String,
        reason: String,
    },

    #[error("Failed to get events for accounts [{}]: {source}", accounts.join(", "))]
    Aggregation {
        accounts: Vec<String>,
        #[source]
        source: Box<FigoroError>,
    },

    #[error("A worker finished without reporting a result")]
    WorkerLost,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0:?}")]
    ProviderTimeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for figoro operations.
pub type FigoroResult<T> = Result<T, FigoroError>;
