//! # Ledger Events
//!
//! Defines every event that flows through the shared bus. Each committed
//! state transition of the registry or the certificate ledger produces one
//! or more of these.

use serde::{Deserialize, Serialize};
use shared_types::access::Role;
use shared_types::entities::{Address, DocumentHash, Timestamp, TokenId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // DOCUMENT REGISTRY
    // =========================================================================
    /// A document hash was timestamped.
    DocumentRegistered {
        document_hash: DocumentHash,
        owner: Address,
        timestamp: Timestamp,
        document_type: String,
    },

    /// A batch registration committed `count` documents.
    /// Follows the per-document `DocumentRegistered` events of that batch.
    BatchDocumentsRegistered {
        owner: Address,
        count: u64,
        timestamp: Timestamp,
    },

    /// The owner replaced a document's metadata string.
    MetadataUpdated {
        document_hash: DocumentHash,
        owner: Address,
        metadata: String,
    },

    /// The owner set or moved a document's expiry.
    DocumentExpirySet {
        document_hash: DocumentHash,
        owner: Address,
        expires_at: Timestamp,
    },

    /// A document was revoked by its owner or an administrator.
    DocumentRevoked {
        document_hash: DocumentHash,
        revoked_by: Address,
        reason: String,
        timestamp: Timestamp,
    },

    /// Ownership of a registry entry moved to another identity.
    DocumentOwnershipTransferred {
        document_hash: DocumentHash,
        previous_owner: Address,
        new_owner: Address,
    },

    // =========================================================================
    // CERTIFICATE LEDGER
    // =========================================================================
    /// A certificate was minted for a timestamped document.
    CertificateMinted {
        owner: Address,
        token_id: TokenId,
        document_hash: DocumentHash,
    },

    CertificateTransferred {
        from: Address,
        to: Address,
        token_id: TokenId,
    },

    CertificateBurned { owner: Address, token_id: TokenId },

    CertificateRevoked {
        token_id: TokenId,
        revoked_by: Address,
        reason: String,
    },

    /// The ledger now resolves verification against a different registry.
    RegistryUpdated { previous: Address, current: Address },

    // =========================================================================
    // ACCESS & LIFECYCLE
    // =========================================================================
    RoleGranted {
        role: Role,
        account: Address,
        granted_by: Address,
    },

    RoleRevoked {
        role: Role,
        account: Address,
        revoked_by: Address,
    },

    Paused { by: Address },

    Unpaused { by: Address },
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            LedgerEvent::DocumentRegistered { .. }
            | LedgerEvent::BatchDocumentsRegistered { .. }
            | LedgerEvent::MetadataUpdated { .. }
            | LedgerEvent::DocumentExpirySet { .. }
            | LedgerEvent::DocumentRevoked { .. }
            | LedgerEvent::DocumentOwnershipTransferred { .. } => EventTopic::Documents,

            LedgerEvent::CertificateMinted { .. }
            | LedgerEvent::CertificateTransferred { .. }
            | LedgerEvent::CertificateBurned { .. }
            | LedgerEvent::CertificateRevoked { .. }
            | LedgerEvent::RegistryUpdated { .. } => EventTopic::Certificates,

            LedgerEvent::RoleGranted { .. } | LedgerEvent::RoleRevoked { .. } => {
                EventTopic::Access
            }

            LedgerEvent::Paused { .. } | LedgerEvent::Unpaused { .. } => EventTopic::Lifecycle,
        }
    }

    /// Stable event name, used as a log field and metrics label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::DocumentRegistered { .. } => "DocumentRegistered",
            LedgerEvent::BatchDocumentsRegistered { .. } => "BatchDocumentsRegistered",
            LedgerEvent::MetadataUpdated { .. } => "MetadataUpdated",
            LedgerEvent::DocumentExpirySet { .. } => "DocumentExpirySet",
            LedgerEvent::DocumentRevoked { .. } => "DocumentRevoked",
            LedgerEvent::DocumentOwnershipTransferred { .. } => "DocumentOwnershipTransferred",
            LedgerEvent::CertificateMinted { .. } => "CertificateMinted",
            LedgerEvent::CertificateTransferred { .. } => "CertificateTransferred",
            LedgerEvent::CertificateBurned { .. } => "CertificateBurned",
            LedgerEvent::CertificateRevoked { .. } => "CertificateRevoked",
            LedgerEvent::RegistryUpdated { .. } => "RegistryUpdated",
            LedgerEvent::RoleGranted { .. } => "RoleGranted",
            LedgerEvent::RoleRevoked { .. } => "RoleRevoked",
            LedgerEvent::Paused { .. } => "Paused",
            LedgerEvent::Unpaused { .. } => "Unpaused",
        }
    }
}

/// An event stamped with its origin and bus position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Endpoint address of the component that published the event.
    pub source: Address,
    /// Bus-assigned position, starting at 1 and strictly increasing.
    pub sequence: u64,
    pub event: LedgerEvent,
}

impl EventEnvelope {
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.event.topic()
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// All events (no filtering).
    All,
    /// Registry document events.
    Documents,
    /// Certificate ledger events.
    Certificates,
    /// Role grants and revocations.
    Access,
    /// Pause and unpause.
    Lifecycle,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source endpoints to include. Empty means all sources.
    pub sources: Vec<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            sources: Vec::new(),
        }
    }

    /// Create a filter for events from specific component endpoints.
    #[must_use]
    pub fn from_sources(sources: Vec<Address>) -> Self {
        Self {
            topics: Vec::new(),
            sources,
        }
    }

    /// Check if an envelope matches this filter.
    #[must_use]
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&envelope.topic());

        let source_match = self.sources.is_empty() || self.sources.contains(&envelope.source);

        topic_match && source_match
    }
}
