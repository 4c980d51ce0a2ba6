//! # Document Registry (poe-01)
//!
//! Content-addressed store of document provenance: who timestamped a
//! document hash, when, and whether that proof is still valid.
//!
//! ## Responsibilities
//!
//! - Register document hashes, singly or in best-effort batches
//! - Verify documents (`exists && !revoked && !expired`)
//! - Owner operations: metadata, expiry, revocation, ownership transfer
//! - Administrative revocation, pause gate and role management
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Zero hash is never a key | `validate_hash`, batch skip |
//! | Records are never deleted; keys never freed | no removal path in `RegistryState` |
//! | Revocation is monotonic | `mark_revoked` keeps the first mark |
//! | Expiry is strictly in the future when set | `RegistryState::set_expiry` |
//! | Single-item calls are all-or-nothing | validation precedes the first write |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): `RegistryState`, records, errors, config
//! - **Ports Layer** (`ports/`): `DocumentRegistryApi`, `DocumentVerifier`,
//!   outbound `TimeSource` and `EventPublisher`
//! - **Service** (`service.rs`): locking, reentrancy guard, logging, events

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    BatchRegistration, DocumentRecord, RegistryConfig, RegistryError, RegistryState,
    RegistryStats, SkipReason, SkippedDocument, VerificationReport,
};
pub use ports::{DocumentRegistryApi, DocumentVerifier, EventPublisher, TimeSource};
pub use service::DocumentRegistryService;
