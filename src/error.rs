//! Typed errors shared by the scheduler, the platform seams and the console.

use thiserror::Error;

/// Rejected user input for a schedule edit.
///
/// The edit is dropped and the previous schedule stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("hour must be a whole number, got {0:?}")]
    NotANumber(String),
    #[error("hour {0} is outside 0-23")]
    /// A whole number outside 0-23, including ones too large to represent.
    OutOfRange(String),
}

/// Failures reported by a platform service (ringer, notifications).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The service does not exist in this environment; dependent features go inert.
    #[error("{0} service is unavailable")]
    Unavailable(&'static str),
    #[error("{service} call failed: {reason}")]
    CallFailed {
        service: &'static str,
        reason: String,
    },
}

impl PlatformError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
