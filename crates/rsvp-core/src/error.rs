use thiserror::Error;

use crate::attendees::ValidationError;

/// Failures reported by a storage adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write lost: the record already existed on create, or
    /// vanished before an update.
    #[error("conditional write failed: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Errors surfaced by the RSVP operations to their callers.
#[derive(Debug, Error)]
pub enum RsvpError {
    #[error("Guest not found")]
    GuestNotFound,

    #[error("RSVP not found")]
    RsvpNotFound,

    #[error("Admin user not found")]
    AdminNotFound,

    #[error("Invalid invitation code")]
    InvalidCode,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another request won a race on the same record.
    #[error("Concurrent update detected: {0}")]
    Conflict(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<StoreError> for RsvpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => Self::Conflict(detail),
            StoreError::Unavailable(source) => Self::Unavailable(source),
        }
    }
}
