//! # Audit Handler
//!
//! Consumes every event on the bus, writes one structured log line per
//! event and feeds the Prometheus counters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use poe_telemetry::{
    metric_inc, CERTIFICATES_BURNED, CERTIFICATES_MINTED, CERTIFICATES_REVOKED,
    CERTIFICATES_TRANSFERRED, DOCUMENTS_REGISTERED, DOCUMENTS_REVOKED, EVENTS_OBSERVED,
    REFUSED_OPERATIONS,
};
use shared_bus::{EventEnvelope, LedgerEvent, Subscription};

use crate::container::LedgerContainer;

/// Bumps the counters for one event.
pub fn observe_event(event: &LedgerEvent) {
    metric_inc!(EVENTS_OBSERVED, &[event.name()]);
    match event {
        LedgerEvent::DocumentRegistered { .. } => metric_inc!(DOCUMENTS_REGISTERED),
        LedgerEvent::DocumentRevoked { .. } => metric_inc!(DOCUMENTS_REVOKED),
        LedgerEvent::CertificateMinted { .. } => metric_inc!(CERTIFICATES_MINTED),
        LedgerEvent::CertificateTransferred { .. } => metric_inc!(CERTIFICATES_TRANSFERRED),
        LedgerEvent::CertificateBurned { .. } => metric_inc!(CERTIFICATES_BURNED),
        LedgerEvent::CertificateRevoked { .. } => metric_inc!(CERTIFICATES_REVOKED),
        _ => {}
    }
}

/// Copies the components' refusal counters into the refusal gauge.
pub fn sample_refusals(container: &LedgerContainer) {
    let registry = container.registry.stats().refused_operations;
    let ledger = container.ledger.stats().refused_operations;
    REFUSED_OPERATIONS
        .with_label_values(&["registry"])
        .set(i64::try_from(registry).unwrap_or(i64::MAX));
    REFUSED_OPERATIONS
        .with_label_values(&["ledger"])
        .set(i64::try_from(ledger).unwrap_or(i64::MAX));
}

/// Handler logging and counting every bus event.
pub struct AuditHandler {
    subscription: Subscription,
}

impl AuditHandler {
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Run until the bus is dropped. Returns the number of events audited.
    pub async fn run(mut self) -> u64 {
        info!("[audit] Audit handler started");
        let mut audited = 0;

        while let Some(envelope) = self.subscription.recv().await {
            audit(&envelope);
            audited += 1;
        }

        info!(audited, "[audit] Channel closed, exiting");
        audited
    }
}

fn audit(envelope: &EventEnvelope) {
    observe_event(&envelope.event);
    match serde_json::to_string(&envelope.event) {
        Ok(payload) => info!(
            source = %envelope.source,
            sequence = envelope.sequence,
            topic = ?envelope.topic(),
            event = envelope.event.name(),
            %payload,
            "AUDIT"
        ),
        Err(e) => debug!(sequence = envelope.sequence, error = %e, "Unserializable event"),
    }
}

/// Sample refusal counters every `period` until `shutdown` flips.
pub async fn run_refusal_sampler(
    container: Arc<LedgerContainer>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => sample_refusals(&container),
            _ = shutdown.changed() => {
                sample_refusals(&container);
                info!("[metrics] Shutdown signal received");
                return;
            }
        }
    }
}
