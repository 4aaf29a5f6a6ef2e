use thiserror::Error;

/// Failure reported by an operating-system capability (notification center,
/// calendar store, share sheet, key-value storage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
    message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BallotError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("Reminder date is in the past")]
    PastDate,
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid parameters")]
    InvalidParameters,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl BallotError {
    pub fn calendar_access_denied() -> Self {
        Self::PermissionDenied("Calendar access not granted".to_string())
    }

    pub fn event_not_found() -> Self {
        Self::NotFound("Event not found".to_string())
    }
}

pub type BallotResult<T> = Result<T, BallotError>;
