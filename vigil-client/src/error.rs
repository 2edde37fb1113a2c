//! Error types for the Vigil clients

use thiserror::Error;
use vigil_core::poll::{ErrorKind, PollError};

/// Result type alias for Jenkins client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to Jenkins
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    /// The request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Jenkins could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Jenkins answered with a server error or a malformed response
    #[error("Bad HTTP response (status {status}): {message}")]
    BadHttp {
        /// HTTP status code
        status: u16,
        /// Response body or description
        message: String,
    },

    /// Jenkins rejected the request
    #[error("Jenkins API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from Jenkins
        message: String,
    },

    /// The job or node is already defined
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// A poll over Jenkins ran out of budget
    #[error("Jenkins unavailable: {0}")]
    Unavailable(#[source] Box<PollError<ClientError>>),
}

/// Transient-failure classification of [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    Request,
    Timeout,
    Connection,
    NotFound,
    BadHttp,
    Api,
    Parse,
    Unavailable,
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status to the matching error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            500.. => Self::BadHttp { status, message },
            _ => Self::api_error(status, message),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestFailed(err)
        }
    }
}

impl From<PollError<ClientError>> for ClientError {
    fn from(err: PollError<ClientError>) -> Self {
        match err {
            PollError::Disallowed(err) => err,
            other => Self::Unavailable(Box::new(other)),
        }
    }
}

impl ErrorKind for ClientError {
    type Kind = ClientErrorKind;

    fn kind(&self) -> ClientErrorKind {
        match self {
            Self::RequestFailed(_) => ClientErrorKind::Request,
            Self::Timeout(_) => ClientErrorKind::Timeout,
            Self::Connection(_) => ClientErrorKind::Connection,
            Self::NotFound(_) => ClientErrorKind::NotFound,
            Self::BadHttp { .. } => ClientErrorKind::BadHttp,
            Self::ApiError { .. } | Self::AlreadyExists(_) => ClientErrorKind::Api,
            Self::ParseError(_) => ClientErrorKind::Parse,
            Self::Unavailable(_) => ClientErrorKind::Unavailable,
        }
    }
}
