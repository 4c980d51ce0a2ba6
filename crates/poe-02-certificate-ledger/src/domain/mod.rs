//! # Domain Layer
//!
//! Pure domain logic for the Certificate Ledger. The registry is reached
//! only through the outbound `RegistryGateway` port.

pub mod entities;
pub mod errors;
pub mod ledger;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use ledger::*;
pub use value_objects::*;
