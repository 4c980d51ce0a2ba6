//! # Certificate Ledger (poe-02)
//!
//! Transferable, revocable certificates bound one-to-one to timestamped
//! documents in a Document Registry.
//!
//! ## Responsibilities
//!
//! - Mint a certificate for a document the current registry verifies
//! - Transfer and burn certificates; revoke them administratively
//! - Composite verification: certificate live, bound, unrevoked **and**
//!   document still valid in the current registry
//! - Swap the registry endpoint at runtime
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | At most one live certificate per document | `by_document` index checked at mint |
//! | Token ids start at 1 and are never reused | `last_token_id` only grows |
//! | Burn removes the record and both indexes | `LedgerState::burn` |
//! | Verification is never cached | gateway consulted on every call |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): `LedgerState`, records, errors, config
//! - **Ports Layer** (`ports/`): `CertificateLedgerApi`, outbound
//!   `RegistryGateway`, `TimeSource`, `EventPublisher`
//! - **Adapters** (`adapters/`): `InProcessRegistryGateway`
//! - **Service** (`service.rs`): locking, reentrancy guard, logging, events

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InProcessRegistryGateway;
pub use domain::{
    CertificateError, CertificateRecord, GatewayError, LedgerConfig, LedgerState, LedgerStats,
};
pub use ports::{CertificateLedgerApi, EventPublisher, RegistryGateway, TimeSource};
pub use service::CertificateLedgerService;
