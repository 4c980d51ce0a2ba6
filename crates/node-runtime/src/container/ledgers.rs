//! # Ledger Container
//!
//! Holds the deployed components and the shared infrastructure they are
//! wired to.
//!
//! ## Deployment Order
//!
//! ```text
//! 1. Shared infrastructure: event bus, clock, registry gateway
//! 2. Document Registry   at compute_deployment_address(deployer, 0)
//! 3. Gateway endpoint    registry address -> registry verifier
//! 4. Certificate Ledger  at compute_deployment_address(deployer, 1),
//!                        bound to the registry address
//! ```
//!
//! The ledger never holds the registry itself: it stores the registry's
//! address and resolves it through the gateway on every call.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use poe_01_document_registry::{DocumentRegistryService, TimeSource};
use poe_02_certificate_ledger::{
    CertificateError, CertificateLedgerService, InProcessRegistryGateway,
};
use shared_bus::InMemoryEventBus;
use shared_types::{compute_deployment_address, Address, SystemTimeSource};

use crate::container::config::{ConfigError, NodeConfig};

/// Deployment nonce of the Document Registry.
pub const REGISTRY_NONCE: u64 = 0;
/// Deployment nonce of the Certificate Ledger.
pub const LEDGER_NONCE: u64 = 1;

/// Deployment failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("certificate ledger deployment failed: {0}")]
    Ledger(#[from] CertificateError),
}

/// Central container holding both deployed components.
pub struct LedgerContainer {
    /// Document Registry (Component 1).
    pub registry: Arc<DocumentRegistryService>,

    /// Certificate Ledger (Component 2), bound to `registry`.
    pub ledger: Arc<CertificateLedgerService>,

    /// Endpoint table the ledger resolves registry addresses through.
    pub gateway: Arc<InProcessRegistryGateway>,

    /// Event bus and audit trail shared by both components.
    pub event_bus: Arc<InMemoryEventBus>,

    /// Node configuration (immutable after deployment).
    pub config: NodeConfig,
}

impl LedgerContainer {
    /// Deploy both components on the wall clock.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    /// Deploy both components on `clock`.
    #[instrument(name = "ledger_deploy", skip_all, fields(deployer = %config.deployer))]
    pub fn with_clock(
        config: NodeConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;
        let deployer = config.deployer;

        let event_bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let gateway = Arc::new(InProcessRegistryGateway::new());

        let registry_address = compute_deployment_address(deployer, REGISTRY_NONCE);
        let registry = Arc::new(DocumentRegistryService::new(
            registry_address,
            deployer,
            config.registry.clone(),
            clock.clone(),
            event_bus.clone(),
        ));
        gateway.register_endpoint(registry_address, registry.clone());

        let ledger_address = compute_deployment_address(deployer, LEDGER_NONCE);
        let ledger = Arc::new(CertificateLedgerService::new(
            ledger_address,
            deployer,
            registry_address,
            config.ledger.clone(),
            gateway.clone(),
            clock,
            event_bus.clone(),
        )?);

        info!(
            registry = %registry_address,
            ledger = %ledger_address,
            "Components deployed"
        );

        Ok(Self {
            registry,
            ledger,
            gateway,
            event_bus,
            config,
        })
    }

    /// Endpoint address of the registry deployed by this container.
    pub fn registry_address(&self) -> Address {
        compute_deployment_address(self.config.deployer, REGISTRY_NONCE)
    }

    /// Endpoint address of the ledger deployed by this container.
    pub fn ledger_address(&self) -> Address {
        compute_deployment_address(self.config.deployer, LEDGER_NONCE)
    }

    /// Get the event bus for subscribing.
    pub fn event_bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.event_bus)
    }
}
