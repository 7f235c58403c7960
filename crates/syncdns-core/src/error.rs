use thiserror::Error;

/// Result type alias for syncdns operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while keeping rewrites in sync
#[derive(Error, Debug)]
pub enum SyncError {
    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The rewrite authority could not be reached
    #[error("authority unreachable: {0}")]
    Unreachable(String),

    /// The rewrite authority answered with a non-success status
    #[error("authority rejected request ({code}): {message}")]
    Rejected {
        /// HTTP status code
        code: u16,
        /// Response body, if any
        message: String,
    },

    /// The rewrite authority answered with a body we could not decode
    #[error("bad response from authority: {0}")]
    BadResponse(String),

    /// The container runtime API failed
    #[error("container runtime error: {0}")]
    Runtime(String),

    /// The state file could not be read or written
    #[error("state error: {0}")]
    State(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Returns true if the error came from failing to reach a remote service
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Runtime(_))
    }

    /// Returns the HTTP status code if the authority rejected the request
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}
