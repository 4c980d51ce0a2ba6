//! # Core Domain Entities
//!
//! Registry records and the result types of registry queries.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, DocumentHash, Revocation, Timestamp};

/// Provenance facts for one timestamped document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Registry key. Never zero, never changes.
    pub document_hash: DocumentHash,
    /// Current owner. Changes only through ownership transfer.
    pub owner: Address,
    /// Free-form type label set at registration.
    pub document_type: String,
    /// Registration time.
    pub registered_at: Timestamp,
    /// Owner-editable metadata, empty until first set.
    pub metadata: String,
    /// `None` means the document never expires.
    pub expires_at: Option<Timestamp>,
    /// Set once, never cleared.
    pub revocation: Option<Revocation>,
    /// 1-based registration ordinal within this registry.
    pub sequence: u64,
}

impl DocumentRecord {
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revocation.is_some()
    }

    /// Expired once `now` reaches `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expiry| now >= expiry)
    }

    /// Exists, not revoked and not expired.
    #[must_use]
    pub fn is_valid(&self, now: Timestamp) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }
}

/// Breakdown of a document's verification state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub exists: bool,
    pub revoked: bool,
    pub expired: bool,
    pub owner: Option<Address>,
    pub registered_at: Option<Timestamp>,
}

impl VerificationReport {
    /// Report for a hash with no record.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_record(record: &DocumentRecord, now: Timestamp) -> Self {
        Self {
            exists: true,
            revoked: record.is_revoked(),
            expired: record.is_expired(now),
            owner: Some(record.owner),
            registered_at: Some(record.registered_at),
        }
    }

    /// Same predicate as `verify_document`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.exists && !self.revoked && !self.expired
    }
}

/// Why a batch element was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    ZeroHash,
    /// A record already existed before the batch started.
    AlreadyRegistered,
    /// An earlier element of the same batch carried this hash.
    DuplicateInBatch,
    InvalidDocumentType,
}

/// A batch element that was passed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// Position of the element in the submitted batch.
    pub index: usize,
    pub document_hash: DocumentHash,
    pub reason: SkipReason,
}

/// Outcome of a best-effort batch registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRegistration {
    /// Committed hashes, in submission order.
    pub registered: Vec<DocumentHash>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchRegistration {
    /// Number of committed documents.
    #[must_use]
    pub fn count(&self) -> usize {
        self.registered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Records ever created (equals the last assigned sequence).
    pub documents_registered: u64,
    /// Batches that committed at least one element.
    pub batches_committed: u64,
    /// Batch elements skipped.
    pub batch_elements_skipped: u64,
    /// Revocations that changed state.
    pub documents_revoked: u64,
    /// Calls refused with an error.
    pub refused_operations: u64,
}
