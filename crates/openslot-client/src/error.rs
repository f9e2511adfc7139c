//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error (file, timezone, working hours).
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection to the daemon failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Protocol/framing error.
    #[error("protocol error: {0}")]
    Protocol(#[from] openslot_protocol::ProtocolError),

    /// Request timed out.
    #[error("timeout while {0}")]
    Timeout(String),

    /// A command argument could not be parsed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The daemon answered with an error response.
    #[error("daemon error ({code}): {message}")]
    Daemon {
        /// The protocol error code.
        code: String,
        /// The daemon's message.
        message: String,
    },

    /// The daemon answered with a response of the wrong kind.
    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),

    /// Daemon startup failure (serve command).
    #[error(transparent)]
    Server(#[from] openslot_server::ServerError),

    /// Core validation error surfaced directly (working hours etc.).
    #[error(transparent)]
    Core(#[from] openslot_core::CoreError),
}

impl ClientError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
