//! Error types for adaptor operations
//!
//! Every operation either produces a new state or fails with an [`AdaptorError`].
//! The two request outcomes that reach the server boundary are kept distinct:
//! [`AdaptorError::Transport`] when the HTTP client itself failed, and
//! [`AdaptorError::HttpStatus`] when the server answered with a non-success status.

use thiserror::Error;

/// Failure reported by the underlying HTTP client (DNS, connect, client timeout, body read)
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Create a transport error without an underlying cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error wrapping the client's own error
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_connect() {
            format!("connection failed: {}", err)
        } else if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            format!("request failed: {}", err)
        };
        Self::with_source(message, err)
    }
}

/// Errors produced while building, sending, or folding an operation
#[derive(Debug, Error)]
pub enum AdaptorError {
    /// The HTTP client failed before a status code was available
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a status outside 200/201/202
    #[error("Server responded with {status}")]
    HttpStatus { status: u16 },

    /// The run configuration cannot produce a base address or credentials
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Expanded parameters do not describe the requested operation
    #[error("invalid operation parameters: {0}")]
    Parameters(String),

    /// A reference placeholder could not be parsed
    #[error("invalid reference: {0}")]
    Reference(String),

    /// A host-supplied state function failed
    #[error(transparent)]
    Step(#[from] anyhow::Error),
}

impl AdaptorError {
    /// HTTP status code, when the failure came from the server response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, AdaptorError>;
