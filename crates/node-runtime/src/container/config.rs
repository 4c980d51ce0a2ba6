//! # Node Configuration
//!
//! Deployment identity, bus sizing and per-component limits.
//!
//! ## Security Requirements
//!
//! - `deployer` MUST NOT be the zero address: it receives every
//!   administrative role on both components.

use std::env;
use std::str::FromStr;

use poe_01_document_registry::RegistryConfig;
use poe_02_certificate_ledger::LedgerConfig;
use shared_types::Address;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Identity that deploys both components and holds their admin roles.
    pub deployer: Address,
    /// Broadcast channel capacity of the event bus.
    pub bus_capacity: usize,
    /// Seconds between refusal-counter samples.
    pub metrics_interval_secs: u64,
    /// Document Registry limits.
    pub registry: RegistryConfig,
    /// Certificate Ledger limits and metadata endpoint.
    pub ledger: LedgerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            deployer: Address::ZERO,
            bus_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            metrics_interval_secs: 15,
            registry: RegistryConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Deployer not set.
    #[error("deployer is the zero address; set POE_DEPLOYER to a 0x-prefixed 20-byte hex address")]
    ZeroDeployer,

    /// A variable was present but could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// A limit that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

impl NodeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `POE_DEPLOYER`: deployer address (required for `validate`)
    /// - `POE_BUS_CAPACITY`: event bus capacity (default: 1000)
    /// - `POE_METRICS_INTERVAL_SECS`: refusal sampling period (default: 15)
    /// - `POE_MAX_BATCH_SIZE`: registry batch limit (default: 256)
    /// - `POE_MAX_DOCUMENT_TYPE_LEN`: registry type limit (default: 64)
    /// - `POE_MAX_METADATA_LEN`: registry metadata limit (default: 4096)
    /// - `POE_TOKEN_URI_BASE`: certificate metadata prefix
    /// - `POE_MAX_NAME_LEN`: certificate type/name limit (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        override_with(&lookup, "POE_DEPLOYER", &mut config.deployer)?;
        override_with(&lookup, "POE_BUS_CAPACITY", &mut config.bus_capacity)?;
        override_with(
            &lookup,
            "POE_METRICS_INTERVAL_SECS",
            &mut config.metrics_interval_secs,
        )?;
        override_with(
            &lookup,
            "POE_MAX_BATCH_SIZE",
            &mut config.registry.max_batch_size,
        )?;
        override_with(
            &lookup,
            "POE_MAX_DOCUMENT_TYPE_LEN",
            &mut config.registry.max_document_type_len,
        )?;
        override_with(
            &lookup,
            "POE_MAX_METADATA_LEN",
            &mut config.registry.max_metadata_len,
        )?;
        override_with(&lookup, "POE_MAX_NAME_LEN", &mut config.ledger.max_name_len)?;
        if let Some(base) = lookup("POE_TOKEN_URI_BASE") {
            config.ledger.token_uri_base = base;
        }

        Ok(config)
    }

    /// Validate configuration before deployment.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the deployer is the zero address
    /// - a capacity or limit is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deployer.is_zero() {
            return Err(ConfigError::ZeroDeployer);
        }
        let limits = [
            ("bus_capacity", self.bus_capacity),
            ("metrics_interval_secs", self.metrics_interval_secs as usize),
            ("max_batch_size", self.registry.max_batch_size),
            ("max_document_type_len", self.registry.max_document_type_len),
            ("max_name_len", self.ledger.max_name_len),
        ];
        match limits.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::ZeroLimit(*name)),
            None => Ok(()),
        }
    }
}

fn override_with<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup(key) {
        match value.trim().parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => return Err(ConfigError::InvalidValue { key, value }),
        }
    }
    Ok(())
}
