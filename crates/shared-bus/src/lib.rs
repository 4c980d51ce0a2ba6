//! # Shared Bus - Ledger Event Bus
//!
//! Carries the events of both ledgers to the audit trail and to live
//! subscribers.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Registry   │                    │ Audit task / │
//! │   Ledger     │    publish()       │  observers   │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │  + history   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Guarantees
//!
//! - Every published event gets a strictly increasing sequence number.
//! - The history is append-only and keeps events with no live receiver.
//! - Subscribers only see events published after they subscribed.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventEnvelope, EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
