//! Prometheus metrics for the proof-of-existence ledgers.
//!
//! All metrics follow the naming convention: `poe_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DOCUMENT REGISTRY METRICS
    // =========================================================================

    pub static ref DOCUMENTS_REGISTERED: IntCounter = IntCounter::new(
        "poe_registry_documents_registered_total",
        "Total document hashes timestamped"
    ).expect("metric creation failed");

    pub static ref DOCUMENTS_REVOKED: IntCounter = IntCounter::new(
        "poe_registry_documents_revoked_total",
        "Total documents revoked by owners or administrators"
    ).expect("metric creation failed");

    // =========================================================================
    // CERTIFICATE LEDGER METRICS
    // =========================================================================

    pub static ref CERTIFICATES_MINTED: IntCounter = IntCounter::new(
        "poe_ledger_certificates_minted_total",
        "Total certificates minted"
    ).expect("metric creation failed");

    pub static ref CERTIFICATES_TRANSFERRED: IntCounter = IntCounter::new(
        "poe_ledger_certificates_transferred_total",
        "Total certificate transfers"
    ).expect("metric creation failed");

    pub static ref CERTIFICATES_BURNED: IntCounter = IntCounter::new(
        "poe_ledger_certificates_burned_total",
        "Total certificates burned"
    ).expect("metric creation failed");

    pub static ref CERTIFICATES_REVOKED: IntCounter = IntCounter::new(
        "poe_ledger_certificates_revoked_total",
        "Total certificates revoked"
    ).expect("metric creation failed");

    // =========================================================================
    // CROSS-CUTTING METRICS
    // =========================================================================

    /// Events seen on the bus, by event name
    pub static ref EVENTS_OBSERVED: IntCounterVec = IntCounterVec::new(
        Opts::new("poe_eventbus_events_observed_total", "Events observed on the event bus"),
        &["event"]
    ).expect("metric creation failed");

    /// Calls refused with an error, sampled from component statistics
    pub static ref REFUSED_OPERATIONS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("poe_refused_operations", "Calls refused with an error"),
        &["component"]
    ).expect("metric creation failed");
}

/// Handle returned once all metrics are registered.
#[derive(Debug)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors in the registry.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DOCUMENTS_REGISTERED.clone()),
        Box::new(DOCUMENTS_REVOKED.clone()),
        Box::new(CERTIFICATES_MINTED.clone()),
        Box::new(CERTIFICATES_TRANSFERRED.clone()),
        Box::new(CERTIFICATES_BURNED.clone()),
        Box::new(CERTIFICATES_REVOKED.clone()),
        Box::new(EVENTS_OBSERVED.clone()),
        Box::new(REFUSED_OPERATIONS.clone()),
    ];
    let registered = metrics.len();

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
