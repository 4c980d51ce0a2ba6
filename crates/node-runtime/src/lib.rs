//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: components expose ports, the runtime wires
//!   adapters to them
//! - **Event-Driven Audit**: every committed transition reaches the bus and
//!   is logged and counted by the audit handler

pub mod container;
pub mod handlers;

pub use container::{ConfigError, ContainerError, LedgerContainer, NodeConfig};
pub use handlers::AuditHandler;
