//! # Value Objects
//!
//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Registry limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum elements accepted by `batch_register`.
    pub max_batch_size: usize,
    /// Maximum document type length in bytes. Empty types are always rejected.
    pub max_document_type_len: usize,
    /// Maximum metadata length in bytes.
    pub max_metadata_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 256,
            max_document_type_len: 64,
            max_metadata_len: 4096,
        }
    }
}

impl RegistryConfig {
    /// True if `document_type` is non-empty and within the length limit.
    #[must_use]
    pub fn accepts_document_type(&self, document_type: &str) -> bool {
        !document_type.is_empty() && document_type.len() <= self.max_document_type_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_batch_size, 256);
        assert_eq!(config.max_document_type_len, 64);
        assert_eq!(config.max_metadata_len, 4096);
    }

    #[test]
    fn test_document_type_bounds() {
        let config = RegistryConfig::default();
        assert!(config.accepts_document_type("PDF"));
        assert!(!config.accepts_document_type(""));
        assert!(config.accepts_document_type(&"x".repeat(64)));
        assert!(!config.accepts_document_type(&"x".repeat(65)));
    }
}
