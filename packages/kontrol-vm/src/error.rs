//! Error types for the runtime.

use thiserror::Error;

use crate::ids::{ContId, Marker};

/// An exception raised while forcing a step.
///
/// Catch frames inspect these by downcasting (`error.is::<E>()`).
pub type Throwable = anyhow::Error;

#[derive(Debug, Error)]
pub enum VMError {
    /// Structured abort from `Control::failure`. No catch frame ever observes it.
    #[error("aborted: {0}")]
    Aborted(Throwable),

    /// A thrown exception walked the whole continuation without a matching catch frame.
    #[error("uncaught exception: {0}")]
    UncaughtException(Throwable),

    #[error("handler not found for marker {}", .marker.raw())]
    HandlerNotFound { marker: Marker },

    #[error("one-shot violation: continuation {} already consumed", .cont_id.raw())]
    OneShotViolation { cont_id: ContId },

    #[error("captured state frame cannot be {operation}")]
    CapturedFrame { operation: &'static str },

    #[error("type error: {message}")]
    TypeError { message: String },

    #[error("step limit exceeded after {limit} steps")]
    StepLimitExceeded { limit: u64 },
}

impl VMError {
    pub fn aborted(error: impl Into<Throwable>) -> Self {
        VMError::Aborted(error.into())
    }

    pub fn uncaught_exception(error: impl Into<Throwable>) -> Self {
        VMError::UncaughtException(error.into())
    }

    pub fn handler_not_found(marker: Marker) -> Self {
        VMError::HandlerNotFound { marker }
    }

    pub fn one_shot_violation(cont_id: ContId) -> Self {
        VMError::OneShotViolation { cont_id }
    }

    pub fn captured_frame(operation: &'static str) -> Self {
        VMError::CapturedFrame { operation }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        VMError::TypeError {
            message: message.into(),
        }
    }

    pub fn step_limit_exceeded(limit: u64) -> Self {
        VMError::StepLimitExceeded { limit }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, VMError::Aborted(_))
    }

    pub fn is_uncaught(&self) -> bool {
        matches!(self, VMError::UncaughtException(_))
    }

    /// The user-level payload carried by an abort or an uncaught exception.
    pub fn exception(&self) -> Option<&Throwable> {
        match self {
            VMError::Aborted(error) | VMError::UncaughtException(error) => Some(error),
            _ => None,
        }
    }
}
