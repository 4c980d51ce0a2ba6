//! # Shared Types Crate
//!
//! Primitives and guards shared by the Document Registry and the
//! Certificate Ledger.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identity, hash and time primitives are
//!   defined once here.
//! - **Guards live with state**: `AccessControl` and `PauseGate` are plain
//!   values stored inside each component's locked state.
//! - **Serialized mutation**: `ReentrancyGuard` gives every component a
//!   total order over its mutating calls.

pub mod access;
pub mod clock;
pub mod entities;
pub mod errors;
pub mod pause;
pub mod reentrancy;

pub use access::{AccessControl, AccessError, Role};
pub use clock::{ManualClock, SystemTimeSource, TimeSource};
pub use entities::*;
pub use errors::{Categorized, ErrorCategory};
pub use pause::{PauseError, PauseGate};
pub use reentrancy::{ReentrancyError, ReentrancyGuard, ReentrancyLock};
