//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the registry service is constructed with.
//!
//! - `TimeSource`: registration timestamps and expiry checks.
//! - `EventPublisher`: audit trail for every committed transition.

pub use shared_bus::EventPublisher;
pub use shared_types::clock::TimeSource;
