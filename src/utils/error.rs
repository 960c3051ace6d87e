//! Error types shared by the relay engine and its collaborators.
//!
//! Endpoint implementations (sources, sinks, stores) return `RelayResult`
//! from their trait methods. The engine treats these failures as
//! per-collaborator events: a failing fetch contributes zero messages and
//! a failing delivery does not block the remaining destinations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// An endpoint could not be reached or refused the operation.
    #[error("endpoint unavailable: {0}")]
    Unavailable(String),

    /// The channel backing an in-memory endpoint has been closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("storage failure: {0}")]
    Storage(#[from] sled::Error),

    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type RelayResult<T> = Result<T, RelayError>;
