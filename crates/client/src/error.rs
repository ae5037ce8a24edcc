//! Client error types.

use coursesync_core::platform::PlatformError;
use coursesync_core::table::TableError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A student override the platform refused to create.
///
/// Reported per student; the rest of the batch carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Failed to assign assignment {assignment_id} to student {student_id}: {reason}")]
pub struct OverrideCreationError {
    pub assignment_id: u64,
    pub student_id: u64,
    pub reason: String,
}
