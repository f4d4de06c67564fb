use std::time::Duration;

use thiserror::Error;

/// Coarse classification of an [`ApiError`], stable enough for callers to
/// branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Timeout,
    Interrupted,
    RemoteExecution,
    RequestConstruction,
    Decode,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid client configuration: {message}")]
    Configuration { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout { operation: String, after: Duration },

    #[error("{operation} was interrupted: {message}")]
    Interrupted {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} failed: {source}")]
    Execution {
        operation: &'static str,
        source: Box<ApiError>,
    },

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("JSON decode error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Configuration { .. } => ErrorKind::Configuration,
            ApiError::InvalidUrl(_) => ErrorKind::RequestConstruction,
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Interrupted { .. } => ErrorKind::Interrupted,
            ApiError::Execution { .. }
            | ApiError::RequestFailed(_)
            | ApiError::AuthenticationFailed { .. }
            | ApiError::NotFound { .. }
            | ApiError::BadRequest { .. }
            | ApiError::ServerError { .. } => ErrorKind::RemoteExecution,
            ApiError::JsonError(_) | ApiError::InvalidResponse(_) => ErrorKind::Decode,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        ApiError::Configuration {
            message: message.into(),
        }
    }

    /// Translate a transport error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(err: reqwest::Error, operation: &str, after: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Timeout {
                operation: operation.to_string(),
                after,
            }
        } else {
            ApiError::RequestFailed(err)
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationFailed { .. } => {
                Some("Verify the username and password configured for this site")
            }
            ApiError::NotFound { .. } => Some("Check if the issue or project key is correct"),
            ApiError::BadRequest { .. } => Some("Review the request parameters"),
            ApiError::Timeout { .. } => Some("Check your network connection or try again later"),
            ApiError::Execution { source, .. } => source.suggestion(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
