//! # Ports Layer
//!
//! - **Inbound** (`inbound.rs`): the registry API and the read-only
//!   `DocumentVerifier` capability handed to other components.
//! - **Outbound** (`outbound.rs`): clock and event publication.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
