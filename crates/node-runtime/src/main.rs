//! # Proof-of-Existence Node Runtime
//!
//! Deploys one Document Registry and one Certificate Ledger bound to it,
//! and audits their event stream until Ctrl-C.
//!
//! ## Startup Sequence
//!
//! 1. Load telemetry configuration and install logging and metrics
//! 2. Load node configuration and validate the deployer
//! 3. Deploy the components (registry first, then the ledger)
//! 4. Start the audit handler and the refusal sampler
//! 5. Wait for Ctrl-C, then signal shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use node_runtime::handlers::{run_refusal_sampler, AuditHandler};
use node_runtime::{LedgerContainer, NodeConfig};
use poe_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use shared_bus::EventFilter;

/// The main node runtime.
pub struct NodeRuntime {
    /// Deployed components.
    container: Arc<LedgerContainer>,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Deploy the components described by `config`.
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating proof-of-existence node runtime");
        let container =
            Arc::new(LedgerContainer::new(config).context("Failed to deploy components")?);
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Start the background handlers.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Proof-of-Existence Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let audit = AuditHandler::new(self.container.event_bus.subscribe(EventFilter::all()));
        let mut audit_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = audit.run() => {}
                _ = audit_shutdown.changed() => {
                    info!("[audit] Shutdown signal received");
                }
            }
        });

        tokio::spawn(run_refusal_sampler(
            Arc::clone(&self.container),
            Duration::from_secs(self.container.config.metrics_interval_secs),
            self.shutdown_rx.clone(),
        ));

        info!(
            registry = %self.container.registry_address(),
            ledger = %self.container.ledger_address(),
            deployer = %self.container.config.deployer,
            "Components running"
        );
    }

    /// Shutdown the node gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        // Let handlers observe the signal.
        tokio::time::sleep(Duration::from_millis(200)).await;

        match encode_metrics() {
            Ok(metrics) => info!(
                events = self.container.event_bus.last_sequence(),
                "Final metrics:\n{metrics}"
            ),
            Err(e) => error!("Failed to encode metrics: {}", e),
        }
        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Failed to load configuration")?;

    let runtime = NodeRuntime::new(config)?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
