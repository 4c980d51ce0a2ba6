//! # Event Subscriber
//!
//! Receiving side of the bus: pull-style `Subscription` handles and a
//! `Stream` adapter, both filtered and both counted per topic until dropped.

use crate::events::{EventEnvelope, EventFilter};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every sender is gone; no further envelopes will arrive.
    #[error("event bus closed")]
    Closed,
}

/// Tracks one live subscription in the bus's per-topic counts.
pub(crate) struct Registration {
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    topic_key: String,
}

impl Registration {
    pub(crate) fn new(subscriptions: Arc<RwLock<HashMap<String, usize>>>, topic_key: String) -> Self {
        Self {
            subscriptions,
            topic_key,
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut subs = self.subscriptions.write();
        if let Some(count) = subs.get_mut(&self.topic_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subs.remove(&self.topic_key);
            }
        }
        debug!(topic = %self.topic_key, "Subscription dropped");
    }
}

/// Filtered receiver of envelopes published after the call to `subscribe`.
///
/// Dropping the handle releases its slot in the per-topic counts.
pub struct Subscription {
    receiver: broadcast::Receiver<EventEnvelope>,
    filter: EventFilter,
    _registration: Registration,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<EventEnvelope>,
        filter: EventFilter,
        registration: Registration,
    ) -> Self {
        Self {
            receiver,
            filter,
            _registration: registration,
        }
    }

    /// Wait for the next matching envelope. `None` once the bus is dropped.
    ///
    /// A lagging receiver skips the overwritten envelopes and keeps going;
    /// the bus history still holds them.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            let envelope = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&envelope) {
                return Some(envelope);
            }
        }
    }

    /// Non-blocking `recv`: `Ok(None)` when nothing matching is buffered.
    pub fn try_recv(&mut self) -> Result<Option<EventEnvelope>, SubscriptionError> {
        loop {
            let envelope = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&envelope) {
                return Ok(Some(envelope));
            }
        }
    }

    #[must_use]
    pub fn event_filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// `Stream` form of a subscription, for consumers built on stream combinators.
pub struct EventStream {
    inner: BroadcastStream<EventEnvelope>,
    filter: EventFilter,
    _registration: Registration,
}

impl EventStream {
    pub(crate) fn new(
        receiver: broadcast::Receiver<EventEnvelope>,
        filter: EventFilter,
        registration: Registration,
    ) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
            _registration: registration,
        }
    }

    #[must_use]
    pub fn event_filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = EventEnvelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(envelope))) => {
                    if self.filter.matches(&envelope) {
                        return Poll::Ready(Some(envelope));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
