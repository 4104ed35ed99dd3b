// --- File: crates/oasis_common/src/error.rs ---
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The base error type for all Oasis scheduling errors.
///
/// Every failing operation in the scheduling core aborts with one of these
/// variants and zero side effects; nothing is silently coerced or partially
/// committed. `TypeMismatch` warnings are deliberately NOT part of this enum:
/// they are recoverable outcomes, not errors (see the waitlist matcher).
#[derive(Error, Debug)]
pub enum OasisError {
    /// Missing or invalid branch, resource, or interval.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown resource, service, booking, or waitlist entry.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The proposed (resource, interval) assignment overlaps an active booking.
    #[error("Conflict: {message}")]
    Conflict {
        /// Booking the proposal collided with, when known.
        with: Option<Uuid>,
        message: String,
    },

    /// Illegal lifecycle move, including any transition out of a terminal state.
    #[error("Invalid transition: cannot {action} a {from} booking")]
    InvalidTransition { from: String, action: String },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything that indicates a bug rather than bad input.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for OasisError {
    fn status_code(&self) -> u16 {
        match self {
            OasisError::Validation(_) => 400,
            OasisError::NotFound(_) => 404,
            OasisError::Conflict { .. } => 409,
            OasisError::InvalidTransition { .. } => 409,
            OasisError::Config(_) => 500,
            OasisError::Internal(_) => 500,
        }
    }
}

// Utility constructors, mirroring how call sites read.
pub fn validation_error<T: fmt::Display>(message: T) -> OasisError {
    OasisError::Validation(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> OasisError {
    OasisError::NotFound(message.to_string())
}

pub fn conflict<T: fmt::Display>(with: Option<Uuid>, message: T) -> OasisError {
    OasisError::Conflict {
        with,
        message: message.to_string(),
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> OasisError {
    OasisError::Config(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> OasisError {
    OasisError::Internal(message.to_string())
}

impl From<serde_json::Error> for OasisError {
    fn from(err: serde_json::Error) -> Self {
        OasisError::Internal(format!("serialization failure: {err}"))
    }
}

impl From<std::io::Error> for OasisError {
    fn from(err: std::io::Error) -> Self {
        OasisError::Internal(err.to_string())
    }
}
