use thiserror::Error;

/// Errors raised by platform API calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A read returned a non-success status. Reads are never retried.
    #[error("Failed to fetch {resource}: {status}, {body}")]
    Fetch {
        resource: String,
        status: u16,
        body: String,
    },
    /// A create, update or delete returned a non-success status.
    #[error("Failed to {action}: {status}, {body}")]
    Mutation {
        action: String,
        status: u16,
        body: String,
    },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PlatformError {
    /// HTTP status carried by the error, if the request got a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Fetch { status, .. } | PlatformError::Mutation { status, .. } => {
                Some(*status)
            }
            PlatformError::Transport(_) | PlatformError::InvalidResponse(_) => None,
        }
    }
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
