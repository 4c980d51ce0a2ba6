//! # Event Publisher
//!
//! The `EventPublisher` port the ledgers depend on, and the in-memory bus
//! that implements it.
//!
//! Publishing is synchronous: ledgers publish from inside their mutating
//! entry points, while the reentrancy guard is still held.

use crate::events::{EventEnvelope, EventFilter, LedgerEvent};
use crate::subscriber::{EventStream, Registration, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::{Mutex, RwLock};
use shared_types::entities::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Outbound port through which ledgers emit their transitions.
pub trait EventPublisher: Send + Sync {
    /// Publish an event on behalf of the component at `source`.
    ///
    /// Returns the sequence number assigned to the event.
    fn publish(&self, source: Address, event: LedgerEvent) -> u64;

    /// Number of events accepted so far.
    fn events_published(&self) -> u64;
}

/// Event bus backed by a broadcast channel.
///
/// Uses `tokio::sync::broadcast` for live subscribers and keeps an
/// append-only history that serves as the audit trail.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventEnvelope>,

    /// Every envelope ever published, in sequence order.
    history: Mutex<Vec<EventEnvelope>>,

    /// Live subscriptions keyed by their topic list.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    events_published: AtomicU64,

    /// Per-subscriber buffer before a receiver starts lagging.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus with `DEFAULT_CHANNEL_CAPACITY`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            history: Mutex::new(Vec::new()),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Only events published after this call are delivered; use
    /// [`history_matching`](Self::history_matching) for earlier ones.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let registration = self.register(&filter);
        Subscription::new(receiver, filter, registration)
    }

    /// Like [`subscribe`](Self::subscribe), as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        let receiver = self.sender.subscribe();
        let registration = self.register(&filter);
        EventStream::new(receiver, filter, registration)
    }

    /// Live receivers, including unfiltered ones.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Active subscriptions grouped by their topic set.
    #[must_use]
    pub fn subscriptions_by_topic(&self) -> HashMap<String, usize> {
        self.subscriptions.read().clone()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the full audit trail.
    #[must_use]
    pub fn history(&self) -> Vec<EventEnvelope> {
        self.history.lock().clone()
    }

    /// Audit trail entries accepted by `filter`.
    #[must_use]
    pub fn history_matching(&self, filter: &EventFilter) -> Vec<EventEnvelope> {
        self.history
            .lock()
            .iter()
            .filter(|envelope| filter.matches(envelope))
            .cloned()
            .collect()
    }

    /// Sequence number of the most recent event, 0 if none.
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.history
            .lock()
            .last()
            .map_or(0, |envelope| envelope.sequence)
    }

    fn register(&self, filter: &EventFilter) -> Registration {
        let topic_key = format!("{:?}", filter.topics);
        *self
            .subscriptions
            .write()
            .entry(topic_key.clone())
            .or_insert(0) += 1;

        debug!(topics = ?filter.topics, sources = ?filter.sources, "New subscription created");
        Registration::new(self.subscriptions.clone(), topic_key)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, source: Address, event: LedgerEvent) -> u64 {
        // Sequence assignment, history append and broadcast happen under one
        // lock so subscribers observe the same order as the history.
        let mut history = self.history.lock();
        let sequence = history.len() as u64 + 1;
        let envelope = EventEnvelope {
            source,
            sequence,
            event,
        };
        let name = envelope.event.name();
        history.push(envelope.clone());
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(envelope) {
            Ok(receivers) => {
                debug!(event = name, %source, sequence, receivers, "Event published");
            }
            Err(_) => {
                debug!(event = name, %source, sequence, "Event recorded (no live receivers)");
            }
        }
        sequence
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
