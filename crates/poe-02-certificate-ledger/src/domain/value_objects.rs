//! # Value Objects
//!
//! Ledger configuration.

use serde::{Deserialize, Serialize};
use shared_types::entities::TokenId;

/// Default prefix for token metadata URIs.
pub const DEFAULT_TOKEN_URI_BASE: &str = "https://proof-of-existence.example/token/";

/// Ledger limits and metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Prefix joined with the decimal token id by `token_uri`.
    pub token_uri_base: String,
    /// Maximum length in bytes of `document_type` and `document_name`.
    pub max_name_len: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            token_uri_base: DEFAULT_TOKEN_URI_BASE.to_string(),
            max_name_len: 256,
        }
    }
}

impl LedgerConfig {
    #[must_use]
    pub fn token_uri(&self, token_id: TokenId) -> String {
        format!("{}{}", self.token_uri_base, token_id)
    }
}
