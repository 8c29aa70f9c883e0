//! Error types for the guidecane core

use thiserror::Error;

/// Result type alias for guidecane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core and its collaborators.
///
/// Sensing failures never reach this type: a timed-out echo or an unreadable
/// sentence is handled where it happens. What remains is configuration,
/// I/O and collaborator trouble, none of which is allowed to stop a task.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Audio encoding or capture error
    #[error("audio error: {0}")]
    Audio(String),

    /// A collaborator answered, but not usefully
    #[error("{service} failed: {reason}")]
    Collaborator {
        service: &'static str,
        reason: String,
    },

    /// A collaborator did not answer in time
    #[error("{service} timed out")]
    Timeout { service: &'static str },
}

impl Error {
    pub fn collaborator(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            reason: reason.into(),
        }
    }
}
