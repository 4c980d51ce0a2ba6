//! # Ledger Container
//!
//! Configuration plus the deployed Document Registry and Certificate Ledger
//! with their shared infrastructure.

pub mod config;
pub mod ledgers;

pub use config::{ConfigError, NodeConfig};
pub use ledgers::{ContainerError, LedgerContainer};
