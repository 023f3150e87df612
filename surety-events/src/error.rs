//! Error types for the notification bus

use thiserror::Error;

/// Notification bus error
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bus closed (all subscribers dropped and sender gone)
    #[error("Bus closed: {0}")]
    Closed(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
