//! # Inbound Ports (Driving Ports)
//!
//! Public API of the Certificate Ledger.

use crate::domain::{CertificateError, CertificateRecord};
use shared_types::entities::{Address, DocumentHash, RevocationOutcome, TokenId};
use shared_types::Role;

/// Primary API for the Certificate Ledger.
pub trait CertificateLedgerApi: Send + Sync {
    // =========================================================================
    // ISSUANCE
    // =========================================================================

    /// Issue a certificate for a document the current registry vouches for.
    ///
    /// ## Errors
    ///
    /// - `Pause(Paused)`: the ledger is paused
    /// - `InvalidHash`: zero hash
    /// - `RegistryUnavailable`: the registry endpoint cannot be resolved
    /// - `DocumentNotTimestamped`: the registry does not verify the document
    /// - `CertificateExists`: a live certificate is bound to the hash
    /// - `InvalidCertificateField`: empty or over-long type or name
    fn mint_certificate(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        document_type: &str,
        document_name: &str,
    ) -> Result<TokenId, CertificateError>;

    // =========================================================================
    // VERIFICATION
    // =========================================================================

    /// True iff the certificate exists, is bound to `document_hash`, is not
    /// revoked and the current registry verifies the document.
    fn verify_document_certificate(&self, document_hash: DocumentHash, token_id: TokenId) -> bool;

    /// Registry verification only. All false when the registry is unreachable.
    fn verify_multiple_documents(&self, document_hashes: &[DocumentHash]) -> Vec<bool>;

    // =========================================================================
    // OWNER OPERATIONS
    // =========================================================================

    fn transfer_certificate(
        &self,
        caller: Address,
        token_id: TokenId,
        to: Address,
    ) -> Result<(), CertificateError>;

    fn burn_certificate(&self, caller: Address, token_id: TokenId) -> Result<(), CertificateError>;

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    /// Requires `CertificateManager`. Never touches the registry.
    fn revoke_certificate(
        &self,
        caller: Address,
        token_id: TokenId,
        reason: &str,
    ) -> Result<RevocationOutcome, CertificateError>;

    /// Requires `RegistryManager`.
    fn set_timestamp_registry(
        &self,
        caller: Address,
        endpoint: Address,
    ) -> Result<(), CertificateError>;

    fn pause(&self, caller: Address) -> Result<(), CertificateError>;

    fn unpause(&self, caller: Address) -> Result<(), CertificateError>;

    fn grant_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, CertificateError>;

    fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, CertificateError>;

    fn renounce_role(&self, caller: Address, role: Role) -> Result<bool, CertificateError>;

    // =========================================================================
    // QUERIES
    // =========================================================================

    fn get_certificate_by_document_hash(
        &self,
        document_hash: DocumentHash,
    ) -> Result<TokenId, CertificateError>;

    fn get_certificate_details(&self, token_id: TokenId)
        -> Result<CertificateRecord, CertificateError>;

    /// Live tokens owned by `owner`. Order is not significant.
    fn get_tokens_by_owner(&self, owner: Address) -> Vec<TokenId>;

    fn owner_of(&self, token_id: TokenId) -> Result<Address, CertificateError>;

    fn is_certificate_revoked(&self, token_id: TokenId) -> Result<bool, CertificateError>;

    /// Last allocated token id, 0 before the first mint.
    fn current_token_id(&self) -> TokenId;

    fn token_uri(&self, token_id: TokenId) -> Result<String, CertificateError>;

    /// Current registry endpoint.
    fn timestamp_registry(&self) -> Address;

    fn has_role(&self, role: Role, account: Address) -> bool;

    fn role_members(&self, role: Role) -> Vec<Address>;

    fn is_paused(&self) -> bool;

    /// Endpoint address of this ledger instance.
    fn address(&self) -> Address;
}
