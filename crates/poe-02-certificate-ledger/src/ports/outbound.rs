//! # Outbound Ports (Driven Ports)
//!
//! - `RegistryGateway`: resolves a registry endpoint and asks it whether a
//!   document is currently valid. The ledger stores only the endpoint
//!   address; the gateway is consulted on every mint and verification.
//! - `TimeSource`: mint and revocation timestamps.
//! - `EventPublisher`: audit trail.

use crate::domain::GatewayError;
use shared_types::entities::{Address, DocumentHash};

pub use shared_bus::EventPublisher;
pub use shared_types::clock::TimeSource;

/// Read-only access to document registries by endpoint address.
pub trait RegistryGateway: Send + Sync {
    /// `verify_document` on the registry at `registry`.
    fn verify_document(
        &self,
        registry: Address,
        document_hash: DocumentHash,
    ) -> Result<bool, GatewayError>;

    /// Elementwise `verify_document` against one endpoint.
    fn verify_many(
        &self,
        registry: Address,
        document_hashes: &[DocumentHash],
    ) -> Result<Vec<bool>, GatewayError> {
        document_hashes
            .iter()
            .map(|hash| self.verify_document(registry, *hash))
            .collect()
    }
}
