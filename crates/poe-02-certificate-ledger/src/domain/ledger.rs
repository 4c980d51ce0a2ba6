//! # Ledger State Machine
//!
//! Pure state transitions of the Certificate Ledger. The registry is never
//! held here: mint receives a verification closure that resolves the
//! current endpoint, and the service re-derives composite validity on
//! every query.

use crate::domain::entities::CertificateRecord;
use crate::domain::errors::{CertificateError, GatewayError};
use crate::domain::value_objects::LedgerConfig;
use shared_types::entities::{
    Address, DocumentHash, Revocation, RevocationOutcome, Timestamp, TokenId,
};
use shared_types::{AccessControl, PauseGate, Role};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Roles the deployer receives on a fresh ledger.
pub const DEPLOYER_ROLES: [Role; 4] = [
    Role::Admin,
    Role::Pauser,
    Role::RegistryManager,
    Role::CertificateManager,
];

/// Metadata supplied by the minter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest<'a> {
    pub document_hash: DocumentHash,
    pub document_type: &'a str,
    pub document_name: &'a str,
}

/// All mutable state of one ledger instance.
#[derive(Debug, Clone)]
pub struct LedgerState {
    config: LedgerConfig,
    certificates: BTreeMap<TokenId, CertificateRecord>,
    by_document: HashMap<DocumentHash, TokenId>,
    owner_index: HashMap<Address, BTreeSet<TokenId>>,
    last_token_id: TokenId,
    registry: Address,
    access: AccessControl,
    pause: PauseGate,
}

impl LedgerState {
    /// Fails with `InvalidRegistryEndpoint` on a zero `registry`.
    pub fn new(
        deployer: Address,
        registry: Address,
        config: LedgerConfig,
    ) -> Result<Self, CertificateError> {
        if registry.is_zero() {
            return Err(CertificateError::InvalidRegistryEndpoint);
        }
        Ok(Self {
            config,
            certificates: BTreeMap::new(),
            by_document: HashMap::new(),
            owner_index: HashMap::new(),
            last_token_id: 0,
            registry,
            access: AccessControl::with_deployer(deployer, &DEPLOYER_ROLES),
            pause: PauseGate::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut AccessControl {
        &mut self.access
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Current registry endpoint.
    #[must_use]
    pub fn registry(&self) -> Address {
        self.registry
    }

    // =========================================================================
    // MINT
    // =========================================================================

    /// Issues the next token to `caller`.
    ///
    /// `verify` is asked whether the registry at the current endpoint vouches
    /// for the document; it runs after pause and hash checks and before any
    /// write.
    pub fn mint(
        &mut self,
        caller: Address,
        request: MintRequest<'_>,
        now: Timestamp,
        verify: impl FnOnce(Address, DocumentHash) -> Result<bool, GatewayError>,
    ) -> Result<CertificateRecord, CertificateError> {
        self.pause.ensure_not_paused()?;
        let document_hash = request.document_hash;
        if document_hash.is_zero() {
            return Err(CertificateError::InvalidHash);
        }
        if !verify(self.registry, document_hash)? {
            return Err(CertificateError::DocumentNotTimestamped(document_hash));
        }
        if let Some(&token_id) = self.by_document.get(&document_hash) {
            return Err(CertificateError::CertificateExists {
                document_hash,
                token_id,
            });
        }
        self.validate_field("document_type", request.document_type)?;
        self.validate_field("document_name", request.document_name)?;

        self.last_token_id += 1;
        let token_id = self.last_token_id;
        let record = CertificateRecord {
            token_id,
            document_hash,
            document_type: request.document_type.to_string(),
            document_name: request.document_name.to_string(),
            owner: caller,
            revocation: None,
            minted_at: now,
            issuing_registry: self.registry,
        };
        self.certificates.insert(token_id, record.clone());
        self.by_document.insert(document_hash, token_id);
        self.owner_index.entry(caller).or_default().insert(token_id);
        Ok(record)
    }

    fn validate_field(&self, field: &'static str, value: &str) -> Result<(), CertificateError> {
        let max = self.config.max_name_len;
        if value.is_empty() || value.len() > max {
            return Err(CertificateError::InvalidCertificateField {
                field,
                len: value.len(),
                max,
            });
        }
        Ok(())
    }

    // =========================================================================
    // OWNER OPERATIONS
    // =========================================================================

    /// Moves `token_id` to `to`. Returns the previous owner.
    pub fn transfer(
        &mut self,
        caller: Address,
        token_id: TokenId,
        to: Address,
    ) -> Result<Address, CertificateError> {
        self.pause.ensure_not_paused()?;
        self.owned(caller, token_id)?;
        if to.is_zero() {
            return Err(CertificateError::InvalidRecipient);
        }

        let record = self
            .certificates
            .get_mut(&token_id)
            .ok_or(CertificateError::NotFound(token_id))?;
        let from = record.owner;
        record.owner = to;
        self.unindex_owner(from, token_id);
        self.owner_index.entry(to).or_default().insert(token_id);
        Ok(from)
    }

    /// Destroys `token_id`, freeing its document hash for a future mint.
    pub fn burn(
        &mut self,
        caller: Address,
        token_id: TokenId,
    ) -> Result<CertificateRecord, CertificateError> {
        self.pause.ensure_not_paused()?;
        self.owned(caller, token_id)?;

        let record = self
            .certificates
            .remove(&token_id)
            .ok_or(CertificateError::NotFound(token_id))?;
        self.by_document.remove(&record.document_hash);
        self.unindex_owner(record.owner, token_id);
        Ok(record)
    }

    fn owned(
        &self,
        caller: Address,
        token_id: TokenId,
    ) -> Result<&CertificateRecord, CertificateError> {
        let record = self.get(token_id)?;
        if record.owner != caller {
            return Err(CertificateError::NotOwner { token_id, caller });
        }
        Ok(record)
    }

    fn unindex_owner(&mut self, owner: Address, token_id: TokenId) {
        if let Some(set) = self.owner_index.get_mut(&owner) {
            set.remove(&token_id);
            if set.is_empty() {
                self.owner_index.remove(&owner);
            }
        }
    }

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    /// Marks `token_id` revoked. Requires `CertificateManager`.
    pub fn revoke(
        &mut self,
        caller: Address,
        token_id: TokenId,
        reason: &str,
        now: Timestamp,
    ) -> Result<RevocationOutcome, CertificateError> {
        self.pause.ensure_not_paused()?;
        self.access.ensure_role(Role::CertificateManager, caller)?;
        if token_id == 0 {
            return Err(CertificateError::InvalidTokenId);
        }
        let record = self
            .certificates
            .get_mut(&token_id)
            .ok_or(CertificateError::NotFound(token_id))?;
        if record.revocation.is_some() {
            return Ok(RevocationOutcome::AlreadyRevoked);
        }
        record.revocation = Some(Revocation {
            reason: reason.to_string(),
            revoked_by: caller,
            revoked_at: now,
        });
        Ok(RevocationOutcome::Revoked)
    }

    /// Points the ledger at another registry. Returns the previous endpoint.
    ///
    /// Existing certificates are not re-validated.
    pub fn set_registry(
        &mut self,
        caller: Address,
        endpoint: Address,
    ) -> Result<Address, CertificateError> {
        self.pause.ensure_not_paused()?;
        self.access.ensure_role(Role::RegistryManager, caller)?;
        if endpoint.is_zero() {
            return Err(CertificateError::InvalidRegistryEndpoint);
        }
        Ok(std::mem::replace(&mut self.registry, endpoint))
    }

    pub fn pause(&mut self, caller: Address) -> Result<(), CertificateError> {
        self.access.ensure_role(Role::Pauser, caller)?;
        self.pause.engage()?;
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), CertificateError> {
        self.access.ensure_role(Role::Pauser, caller)?;
        self.pause.release()?;
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Live certificate by id. `InvalidTokenId` on 0, `NotFound` if absent.
    pub fn get(&self, token_id: TokenId) -> Result<&CertificateRecord, CertificateError> {
        if token_id == 0 {
            return Err(CertificateError::InvalidTokenId);
        }
        self.certificates
            .get(&token_id)
            .ok_or(CertificateError::NotFound(token_id))
    }

    pub fn by_document(&self, document_hash: &DocumentHash) -> Result<TokenId, CertificateError> {
        self.by_document
            .get(document_hash)
            .copied()
            .ok_or(CertificateError::NoCertificateForDocument(*document_hash))
    }

    /// Live tokens owned by `owner`, ascending.
    #[must_use]
    pub fn tokens_of(&self, owner: &Address) -> Vec<TokenId> {
        self.owner_index
            .get(owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Last allocated id; 0 before the first mint.
    #[must_use]
    pub fn current_token_id(&self) -> TokenId {
        self.last_token_id
    }

    pub fn token_uri(&self, token_id: TokenId) -> Result<String, CertificateError> {
        self.get(token_id)?;
        Ok(self.config.token_uri(token_id))
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.certificates.len()
    }
}
