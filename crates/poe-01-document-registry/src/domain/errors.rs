//! # Domain Errors
//!
//! Error types for the Document Registry.

use shared_types::entities::{Address, DocumentHash, Timestamp};
use shared_types::errors::{Categorized, ErrorCategory};
use shared_types::{AccessError, PauseError, ReentrancyError};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The zero hash is never a valid key.
    #[error("invalid document hash: zero")]
    InvalidHash,

    #[error("document {0} already registered")]
    AlreadyExists(DocumentHash),

    #[error("document {0} not found")]
    NotFound(DocumentHash),

    #[error("caller {caller} is not the owner of document {document_hash}")]
    NotOwner {
        document_hash: DocumentHash,
        caller: Address,
    },

    /// Batch hash and type lists differ in length.
    #[error("length mismatch: {hashes} hashes, {types} document types")]
    LengthMismatch { hashes: usize, types: usize },

    #[error("batch of {size} exceeds limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Empty or over-long document type.
    #[error("invalid document type of length {len} (max {max})")]
    InvalidDocumentType { len: usize, max: usize },

    #[error("metadata of {len} bytes exceeds limit of {max}")]
    MetadataTooLarge { len: usize, max: usize },

    /// Expiry must be strictly in the future.
    #[error("invalid expiry {expires_at}: must be after {now}")]
    InvalidExpiryDate { expires_at: Timestamp, now: Timestamp },

    /// Expiry can no longer be changed once reached.
    #[error("document {document_hash} expired at {expired_at}")]
    DocumentExpired {
        document_hash: DocumentHash,
        expired_at: Timestamp,
    },

    /// Ownership cannot move to the zero address.
    #[error("invalid recipient: zero address")]
    InvalidRecipient,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Pause(#[from] PauseError),

    #[error(transparent)]
    Reentrancy(#[from] ReentrancyError),
}

impl Categorized for RegistryError {
    fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::InvalidHash
            | RegistryError::LengthMismatch { .. }
            | RegistryError::BatchTooLarge { .. }
            | RegistryError::InvalidDocumentType { .. }
            | RegistryError::MetadataTooLarge { .. }
            | RegistryError::InvalidExpiryDate { .. }
            | RegistryError::InvalidRecipient => ErrorCategory::Validation,
            RegistryError::AlreadyExists(_) | RegistryError::DocumentExpired { .. } => {
                ErrorCategory::Conflict
            }
            RegistryError::NotOwner { .. } => ErrorCategory::Authorization,
            RegistryError::NotFound(_) => ErrorCategory::NotFound,
            RegistryError::Access(e) => e.category(),
            RegistryError::Pause(e) => e.category(),
            RegistryError::Reentrancy(e) => e.category(),
        }
    }
}
