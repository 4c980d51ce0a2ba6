//! # In-Process Registry Gateway
//!
//! Resolves registry endpoints to `DocumentVerifier` handles living in the
//! same process. Endpoints can be added and removed at runtime; a removed
//! endpoint resolves to `GatewayError::UnknownEndpoint`.

use crate::domain::GatewayError;
use crate::ports::outbound::RegistryGateway;
use parking_lot::RwLock;
use poe_01_document_registry::DocumentVerifier;
use shared_types::entities::{Address, DocumentHash};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Endpoint table of registries reachable from this process.
#[derive(Default)]
pub struct InProcessRegistryGateway {
    endpoints: RwLock<HashMap<Address, Arc<dyn DocumentVerifier>>>,
}

impl InProcessRegistryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `verifier` reachable at `endpoint`, replacing any previous entry.
    pub fn register_endpoint(&self, endpoint: Address, verifier: Arc<dyn DocumentVerifier>) {
        debug!(%endpoint, "Registry endpoint registered");
        self.endpoints.write().insert(endpoint, verifier);
    }

    /// Returns whether the endpoint was known.
    pub fn remove_endpoint(&self, endpoint: Address) -> bool {
        self.endpoints.write().remove(&endpoint).is_some()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.read().len()
    }

    fn resolve(&self, registry: Address) -> Result<Arc<dyn DocumentVerifier>, GatewayError> {
        self.endpoints
            .read()
            .get(&registry)
            .cloned()
            .ok_or(GatewayError::UnknownEndpoint(registry))
    }
}

impl RegistryGateway for InProcessRegistryGateway {
    fn verify_document(
        &self,
        registry: Address,
        document_hash: DocumentHash,
    ) -> Result<bool, GatewayError> {
        // Table lock is released before calling into the registry.
        let verifier = self.resolve(registry)?;
        Ok(verifier.verify_document(document_hash))
    }

    fn verify_many(
        &self,
        registry: Address,
        document_hashes: &[DocumentHash],
    ) -> Result<Vec<bool>, GatewayError> {
        let verifier = self.resolve(registry)?;
        Ok(document_hashes
            .iter()
            .map(|hash| verifier.verify_document(*hash))
            .collect())
    }
}
