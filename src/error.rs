//! Error types for ArchMaster.

use thiserror::Error;

/// Errors surfaced by the topic and chat flows.
///
/// Cache failures are deliberately absent: both cache backends log and
/// swallow them, so they never reach a caller.
#[derive(Debug, Error)]
pub enum ArchError {
    /// Missing or invalid configuration, raised at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model service could not be reached or answered with an error status.
    #[error("Provider error: {message}")]
    Provider {
        /// HTTP status returned by the model service, if a response arrived.
        status: Option<u16>,
        message: String,
    },

    /// The model returned no text for a topic generation request.
    #[error("Gemini returned empty response")]
    EmptyResponse,

    /// The model's text does not decode into a topic document.
    #[error("Failed to decode generated document: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchError {
    /// Build a provider error from a transport failure (no HTTP status).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchError>;
