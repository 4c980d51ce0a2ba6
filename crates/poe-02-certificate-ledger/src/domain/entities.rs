//! # Core Domain Entities
//!
//! Certificate records and ledger statistics.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, DocumentHash, Revocation, Timestamp, TokenId};

/// One live certificate. Removed from the ledger on burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub token_id: TokenId,
    /// Registry key this certificate is bound to. Never changes.
    pub document_hash: DocumentHash,
    pub document_type: String,
    pub document_name: String,
    pub owner: Address,
    /// Set once by a certificate manager, never cleared.
    pub revocation: Option<Revocation>,
    pub minted_at: Timestamp,
    /// Registry endpoint the document was verified against at mint time.
    /// Provenance only; verification always resolves the current endpoint.
    pub issuing_registry: Address,
}

impl CertificateRecord {
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revocation.is_some()
    }
}

/// Ledger statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub certificates_minted: u64,
    pub certificates_transferred: u64,
    pub certificates_burned: u64,
    pub certificates_revoked: u64,
    /// Mints refused because the registry did not vouch for the document.
    pub mints_without_timestamp: u64,
    /// Calls refused with an error.
    pub refused_operations: u64,
}
