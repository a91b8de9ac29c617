//! Error types shared by the host traits and the command layer.

use thiserror::Error;

/// Failure reported by the host for a query or mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Rejected by host: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for HostError {
    fn from(e: std::io::Error) -> Self {
        HostError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HostError>;

/// Failure inside a command handler. Never escapes to the host; the command
/// layer turns it into a notice.
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}
