//! # Error Types
//!
//! Cross-component error classification.

use crate::access::AccessError;
use crate::pause::PauseError;
use crate::reentrancy::ReentrancyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad class of a ledger error, used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed input; retrying unchanged will fail again.
    Validation,
    /// Input collides with existing state.
    Conflict,
    /// Caller lacks ownership or a role.
    Authorization,
    /// Referenced record does not exist.
    NotFound,
    /// Component is paused, busy or cannot reach a collaborator.
    Availability,
}

impl ErrorCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Availability => "availability",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can report their `ErrorCategory`.
pub trait Categorized {
    fn category(&self) -> ErrorCategory;
}

impl Categorized for AccessError {
    fn category(&self) -> ErrorCategory {
        match self {
            AccessError::MissingRole { .. } | AccessError::MissingAnyRole { .. } => {
                ErrorCategory::Authorization
            }
            AccessError::ZeroAccount { .. } => ErrorCategory::Validation,
        }
    }
}

impl Categorized for PauseError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Availability
    }
}

impl Categorized for ReentrancyError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Availability
    }
}
