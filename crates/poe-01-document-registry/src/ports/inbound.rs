//! # Inbound Ports (Driving Ports)
//!
//! Public APIs exposed by the Document Registry.
//!
//! Every mutating call takes the acting identity as `caller`; the registry
//! never infers identity on its own.

use crate::domain::{BatchRegistration, DocumentRecord, RegistryError, VerificationReport};
use shared_types::entities::{Address, DocumentHash, RevocationOutcome, Timestamp};
use shared_types::Role;

/// Read-only verification capability.
///
/// This is the only registry surface other components may depend on.
pub trait DocumentVerifier: Send + Sync {
    /// True iff the document exists, is not revoked and has not expired.
    fn verify_document(&self, document_hash: DocumentHash) -> bool;
}

/// Primary API for the Document Registry.
pub trait DocumentRegistryApi: DocumentVerifier {
    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Timestamp a document hash, owned by `caller`.
    ///
    /// ## Errors
    ///
    /// - `Pause(Paused)`: the registry is paused
    /// - `InvalidHash`: zero hash
    /// - `InvalidDocumentType`: empty or over-long type
    /// - `AlreadyExists`: the hash was registered before (even if revoked)
    fn register(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        document_type: &str,
    ) -> Result<DocumentRecord, RegistryError>;

    /// Best-effort registration of many hashes.
    ///
    /// Zero, duplicate and invalid-type elements are skipped, not fatal.
    /// Fails as a whole only on pause, `LengthMismatch` or `BatchTooLarge`.
    fn batch_register(
        &self,
        caller: Address,
        document_hashes: &[DocumentHash],
        document_types: &[String],
    ) -> Result<BatchRegistration, RegistryError>;

    // =========================================================================
    // VERIFICATION
    // =========================================================================

    fn verify_document_detailed(&self, document_hash: DocumentHash) -> VerificationReport;

    /// Elementwise `verify_document`.
    fn batch_verify_documents(&self, document_hashes: &[DocumentHash]) -> Vec<bool>;

    // =========================================================================
    // OWNER OPERATIONS
    // =========================================================================

    fn update_document_metadata(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        metadata: &str,
    ) -> Result<(), RegistryError>;

    /// `expires_at` must be strictly after the current time.
    fn set_document_expiry(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        expires_at: Timestamp,
    ) -> Result<(), RegistryError>;

    fn revoke_document(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
    ) -> Result<RevocationOutcome, RegistryError>;

    /// Revoke any document. Requires `Admin` or `DocumentManager`.
    fn revoke_document_by_admin(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
    ) -> Result<RevocationOutcome, RegistryError>;

    fn transfer_document_ownership(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        new_owner: Address,
    ) -> Result<(), RegistryError>;

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    fn pause(&self, caller: Address) -> Result<(), RegistryError>;

    fn unpause(&self, caller: Address) -> Result<(), RegistryError>;

    /// Returns whether membership changed.
    fn grant_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, RegistryError>;

    /// Returns whether membership changed.
    fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, RegistryError>;

    fn renounce_role(&self, caller: Address, role: Role) -> Result<bool, RegistryError>;

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Hashes currently owned by `owner`. Order is not significant.
    fn get_user_documents(&self, owner: Address) -> Vec<DocumentHash>;

    fn get_document(&self, document_hash: DocumentHash) -> Result<DocumentRecord, RegistryError>;

    fn get_document_owner(&self, document_hash: DocumentHash) -> Result<Address, RegistryError>;

    /// Fails with `InvalidHash` on the zero hash.
    fn validate_document_hash(&self, document_hash: DocumentHash) -> Result<(), RegistryError>;

    fn has_role(&self, role: Role, account: Address) -> bool;

    fn role_members(&self, role: Role) -> Vec<Address>;

    /// Number of documents ever registered.
    fn document_count(&self) -> u64;

    fn is_paused(&self) -> bool;

    /// Endpoint address of this registry instance.
    fn address(&self) -> Address;
}
