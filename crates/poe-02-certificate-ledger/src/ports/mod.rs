//! # Ports Layer
//!
//! - **Inbound** (`inbound.rs`): the certificate ledger API.
//! - **Outbound** (`outbound.rs`): registry gateway, clock, event publication.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
