//! # Domain Errors
//!
//! Error types for the Certificate Ledger.

use shared_types::entities::{Address, DocumentHash, TokenId};
use shared_types::errors::{Categorized, ErrorCategory};
use shared_types::{AccessError, PauseError, ReentrancyError};
use thiserror::Error;

/// Failures resolving the registry endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No registry is deployed at the endpoint.
    #[error("no registry reachable at {0}")]
    UnknownEndpoint(Address),
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("invalid document hash: zero")]
    InvalidHash,

    /// Token id 0 is never allocated.
    #[error("invalid token id: 0")]
    InvalidTokenId,

    #[error("certificate {0} not found")]
    NotFound(TokenId),

    #[error("caller {caller} is not the owner of certificate {token_id}")]
    NotOwner { token_id: TokenId, caller: Address },

    /// The registry does not currently vouch for the document.
    #[error("document {0} is not timestamped in the current registry")]
    DocumentNotTimestamped(DocumentHash),

    #[error("certificate {token_id} already exists for document {document_hash}")]
    CertificateExists {
        document_hash: DocumentHash,
        token_id: TokenId,
    },

    #[error("no certificate for document {0}")]
    NoCertificateForDocument(DocumentHash),

    #[error("invalid {field}: length {len} (max {max})")]
    InvalidCertificateField {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid recipient: zero address")]
    InvalidRecipient,

    #[error("invalid registry endpoint: zero address")]
    InvalidRegistryEndpoint,

    #[error("registry unavailable: {0}")]
    RegistryUnavailable(#[from] GatewayError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Pause(#[from] PauseError),

    #[error(transparent)]
    Reentrancy(#[from] ReentrancyError),
}

impl Categorized for CertificateError {
    fn category(&self) -> ErrorCategory {
        match self {
            CertificateError::InvalidHash
            | CertificateError::InvalidTokenId
            | CertificateError::InvalidCertificateField { .. }
            | CertificateError::InvalidRecipient
            | CertificateError::InvalidRegistryEndpoint => ErrorCategory::Validation,
            CertificateError::DocumentNotTimestamped(_)
            | CertificateError::CertificateExists { .. } => ErrorCategory::Conflict,
            CertificateError::NotOwner { .. } => ErrorCategory::Authorization,
            CertificateError::NotFound(_) | CertificateError::NoCertificateForDocument(_) => {
                ErrorCategory::NotFound
            }
            CertificateError::RegistryUnavailable(_) => ErrorCategory::Availability,
            CertificateError::Access(e) => e.category(),
            CertificateError::Pause(e) => e.category(),
            CertificateError::Reentrancy(e) => e.category(),
        }
    }
}
