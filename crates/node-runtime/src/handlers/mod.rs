//! # Event Handlers
//!
//! Long-running tasks that consume the event bus.

pub mod audit;

pub use audit::{observe_event, run_refusal_sampler, sample_refusals, AuditHandler};
