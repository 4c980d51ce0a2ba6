//! # Pause Gate
//!
//! Boolean breaker embedded in a component's state. Because it lives next
//! to the data it protects, the check and the state transition happen under
//! the same write lock and cannot be interleaved with `engage`/`release`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pause gate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PauseError {
    /// The gate is engaged.
    #[error("operation refused: component is paused")]
    Paused,

    /// `release` was called while the gate was not engaged.
    #[error("component is not paused")]
    NotPaused,
}

/// Pause state of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseGate {
    paused: bool,
}

impl PauseGate {
    /// Creates an open (unpaused) gate.
    #[must_use]
    pub const fn new() -> Self {
        Self { paused: false }
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fails with `Paused` if the gate is engaged.
    pub const fn ensure_not_paused(&self) -> Result<(), PauseError> {
        if self.paused {
            Err(PauseError::Paused)
        } else {
            Ok(())
        }
    }

    /// Engages the gate. Fails with `Paused` if it is already engaged.
    pub fn engage(&mut self) -> Result<(), PauseError> {
        self.ensure_not_paused()?;
        self.paused = true;
        Ok(())
    }

    /// Releases the gate. Fails with `NotPaused` if it is open.
    pub fn release(&mut self) -> Result<(), PauseError> {
        if !self.paused {
            return Err(PauseError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }
}
