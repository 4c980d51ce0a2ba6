//! # Adapter Implementations
//!
//! Concrete implementations of the ledger's outbound ports.

pub mod registry_gateway;

pub use registry_gateway::InProcessRegistryGateway;
