use thiserror::Error;

/// Errors from a single call to the content API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Only produced when a request timeout is configured.
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The body was not the JSON shape the endpoint promises.
    #[error("Unexpected response format: {0}")]
    Format(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    /// The caller's cancellation token fired before the call finished.
    #[error("Request cancelled")]
    Cancelled,
}

/// Coarse classification of an [`ApiError`], safe to hand to UI code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Format,
    Cancelled,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_)
            | ApiError::Timeout
            | ApiError::HttpStatus(_)
            | ApiError::InvalidUrl(_) => ErrorKind::Transport,
            ApiError::Format(_) | ApiError::ResponseTooLarge(_) => ErrorKind::Format,
            ApiError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Format(err.to_string())
    }
}
