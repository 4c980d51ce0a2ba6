//! # Reentrancy Guard
//!
//! Per-component in-progress flag for mutating entry points.
//!
//! - Re-entry from the thread that already holds the guard fails with
//!   `ReentrantCall`.
//! - Other threads block until the holder finishes, so mutations of one
//!   component are serialized.
//! - The flag is cleared when the `ReentrancyLock` drops, on every exit path.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::Cell;
use std::fmt;
use thiserror::Error;

/// Reentrancy failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReentrancyError {
    /// A mutating call re-entered the component while another was in progress.
    #[error("reentrant call to {operation} while {active} is in progress")]
    ReentrantCall {
        operation: &'static str,
        active: &'static str,
    },
}

/// Serializes mutating calls and refuses same-thread re-entry.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    active: ReentrantMutex<Cell<Option<&'static str>>>,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `operation` as in progress.
    ///
    /// Blocks while another thread holds the guard.
    pub fn enter(&self, operation: &'static str) -> Result<ReentrancyLock<'_>, ReentrancyError> {
        let slot = self.active.lock();
        if let Some(active) = slot.get() {
            return Err(ReentrancyError::ReentrantCall { operation, active });
        }
        slot.set(Some(operation));
        Ok(ReentrancyLock { slot })
    }

    /// Name of the operation in progress on the calling thread, if any.
    ///
    /// Blocks while another thread holds the guard.
    #[must_use]
    pub fn active_operation(&self) -> Option<&'static str> {
        self.active.lock().get()
    }
}

/// RAII handle returned by [`ReentrancyGuard::enter`].
pub struct ReentrancyLock<'a> {
    slot: ReentrantMutexGuard<'a, Cell<Option<&'static str>>>,
}

impl ReentrancyLock<'_> {
    /// The operation this lock was taken for.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        self.slot.get()
    }
}

impl fmt::Debug for ReentrancyLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrancyLock")
            .field("operation", &self.operation())
            .finish()
    }
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.slot.set(None);
    }
}
