//! # Registry State Machine
//!
//! Pure state transitions of the Document Registry. No locking, no clock,
//! no events: callers pass `now` in and turn results into events.
//!
//! Every single-item transition validates fully before its first write, so
//! an `Err` leaves the state untouched.

use crate::domain::entities::{
    BatchRegistration, DocumentRecord, SkipReason, SkippedDocument, VerificationReport,
};
use crate::domain::errors::RegistryError;
use crate::domain::value_objects::RegistryConfig;
use shared_types::entities::{Address, DocumentHash, Revocation, RevocationOutcome, Timestamp};
use shared_types::{AccessControl, PauseGate, Role};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Roles the deployer receives on a fresh registry.
pub const DEPLOYER_ROLES: [Role; 3] = [Role::Admin, Role::DocumentManager, Role::Pauser];

/// Roles allowed to revoke any document.
pub const ADMIN_REVOKER_ROLES: [Role; 2] = [Role::Admin, Role::DocumentManager];

/// All mutable state of one registry instance.
#[derive(Debug, Clone)]
pub struct RegistryState {
    config: RegistryConfig,
    documents: HashMap<DocumentHash, DocumentRecord>,
    owner_index: HashMap<Address, BTreeSet<DocumentHash>>,
    access: AccessControl,
    pause: PauseGate,
    last_sequence: u64,
}

impl RegistryState {
    #[must_use]
    pub fn new(deployer: Address, config: RegistryConfig) -> Self {
        Self {
            config,
            documents: HashMap::new(),
            owner_index: HashMap::new(),
            access: AccessControl::with_deployer(deployer, &DEPLOYER_ROLES),
            pause: PauseGate::new(),
            last_sequence: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
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

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Creates a record owned by `caller`.
    pub fn register(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
        document_type: &str,
        now: Timestamp,
    ) -> Result<DocumentRecord, RegistryError> {
        self.pause.ensure_not_paused()?;
        validate_hash(document_hash)?;
        self.validate_document_type(document_type)?;
        if self.documents.contains_key(&document_hash) {
            return Err(RegistryError::AlreadyExists(document_hash));
        }
        Ok(self.insert(caller, document_hash, document_type, now))
    }

    /// Registers every acceptable element; skips the rest.
    ///
    /// Pause, length mismatch and oversize batches fail as a whole.
    pub fn batch_register(
        &mut self,
        caller: Address,
        document_hashes: &[DocumentHash],
        document_types: &[String],
        now: Timestamp,
    ) -> Result<BatchRegistration, RegistryError> {
        self.pause.ensure_not_paused()?;
        if document_hashes.len() != document_types.len() {
            return Err(RegistryError::LengthMismatch {
                hashes: document_hashes.len(),
                types: document_types.len(),
            });
        }
        if document_hashes.len() > self.config.max_batch_size {
            return Err(RegistryError::BatchTooLarge {
                size: document_hashes.len(),
                max: self.config.max_batch_size,
            });
        }

        let mut outcome = BatchRegistration::default();
        let mut seen = HashSet::with_capacity(document_hashes.len());

        for (index, (hash, document_type)) in
            document_hashes.iter().zip(document_types).enumerate()
        {
            let skip = if hash.is_zero() {
                Some(SkipReason::ZeroHash)
            } else if seen.contains(hash) {
                Some(SkipReason::DuplicateInBatch)
            } else if self.documents.contains_key(hash) {
                Some(SkipReason::AlreadyRegistered)
            } else if !self.config.accepts_document_type(document_type) {
                Some(SkipReason::InvalidDocumentType)
            } else {
                None
            };

            match skip {
                Some(reason) => outcome.skipped.push(SkippedDocument {
                    index,
                    document_hash: *hash,
                    reason,
                }),
                None => {
                    self.insert(caller, *hash, document_type, now);
                    seen.insert(*hash);
                    outcome.registered.push(*hash);
                }
            }
        }

        Ok(outcome)
    }

    fn validate_document_type(&self, document_type: &str) -> Result<(), RegistryError> {
        if self.config.accepts_document_type(document_type) {
            Ok(())
        } else {
            Err(RegistryError::InvalidDocumentType {
                len: document_type.len(),
                max: self.config.max_document_type_len,
            })
        }
    }

    fn insert(
        &mut self,
        owner: Address,
        document_hash: DocumentHash,
        document_type: &str,
        now: Timestamp,
    ) -> DocumentRecord {
        self.last_sequence += 1;
        let record = DocumentRecord {
            document_hash,
            owner,
            document_type: document_type.to_string(),
            registered_at: now,
            metadata: String::new(),
            expires_at: None,
            revocation: None,
            sequence: self.last_sequence,
        };
        self.documents.insert(document_hash, record.clone());
        self.owner_index
            .entry(owner)
            .or_default()
            .insert(document_hash);
        record
    }

    // =========================================================================
    // VERIFICATION
    // =========================================================================

    /// Exists, not revoked, not expired at `now`.
    #[must_use]
    pub fn verify(&self, document_hash: &DocumentHash, now: Timestamp) -> bool {
        self.documents
            .get(document_hash)
            .is_some_and(|record| record.is_valid(now))
    }

    #[must_use]
    pub fn report(&self, document_hash: &DocumentHash, now: Timestamp) -> VerificationReport {
        self.documents
            .get(document_hash)
            .map_or_else(VerificationReport::missing, |record| {
                VerificationReport::for_record(record, now)
            })
    }

    // =========================================================================
    // OWNER OPERATIONS
    // =========================================================================

    /// Replaces the metadata string. Returns the owner.
    pub fn update_metadata(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
        metadata: &str,
    ) -> Result<Address, RegistryError> {
        self.pause.ensure_not_paused()?;
        let max = self.config.max_metadata_len;
        let record = self.owned_mut(caller, document_hash)?;
        if metadata.len() > max {
            return Err(RegistryError::MetadataTooLarge {
                len: metadata.len(),
                max,
            });
        }
        record.metadata = metadata.to_string();
        Ok(record.owner)
    }

    /// Sets or moves the expiry. `expires_at` must be after `now`.
    pub fn set_expiry(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<Address, RegistryError> {
        self.pause.ensure_not_paused()?;
        let record = self.owned_mut(caller, document_hash)?;
        if let Some(expired_at) = record.expires_at.filter(|&at| now >= at) {
            return Err(RegistryError::DocumentExpired {
                document_hash,
                expired_at,
            });
        }
        if expires_at <= now {
            return Err(RegistryError::InvalidExpiryDate { expires_at, now });
        }
        record.expires_at = Some(expires_at);
        Ok(record.owner)
    }

    /// Owner revocation.
    pub fn revoke(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
        now: Timestamp,
    ) -> Result<RevocationOutcome, RegistryError> {
        self.pause.ensure_not_paused()?;
        let record = self.owned_mut(caller, document_hash)?;
        Ok(mark_revoked(record, caller, reason, now))
    }

    /// Revocation by an `Admin` or `DocumentManager` holder.
    pub fn revoke_as_admin(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
        now: Timestamp,
    ) -> Result<RevocationOutcome, RegistryError> {
        self.pause.ensure_not_paused()?;
        self.access.ensure_any_role(&ADMIN_REVOKER_ROLES, caller)?;
        let record = self
            .documents
            .get_mut(&document_hash)
            .ok_or(RegistryError::NotFound(document_hash))?;
        Ok(mark_revoked(record, caller, reason, now))
    }

    /// Moves ownership. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
        new_owner: Address,
    ) -> Result<Address, RegistryError> {
        self.pause.ensure_not_paused()?;
        if new_owner.is_zero() {
            // Existence and ownership still take precedence.
            self.owned(caller, document_hash)?;
            return Err(RegistryError::InvalidRecipient);
        }
        let record = self.owned_mut(caller, document_hash)?;
        let previous = record.owner;
        record.owner = new_owner;

        if let Some(set) = self.owner_index.get_mut(&previous) {
            set.remove(&document_hash);
            if set.is_empty() {
                self.owner_index.remove(&previous);
            }
        }
        self.owner_index
            .entry(new_owner)
            .or_default()
            .insert(document_hash);
        Ok(previous)
    }

    fn owned(
        &self,
        caller: Address,
        document_hash: DocumentHash,
    ) -> Result<&DocumentRecord, RegistryError> {
        let record = self
            .documents
            .get(&document_hash)
            .ok_or(RegistryError::NotFound(document_hash))?;
        if record.owner != caller {
            return Err(RegistryError::NotOwner {
                document_hash,
                caller,
            });
        }
        Ok(record)
    }

    fn owned_mut(
        &mut self,
        caller: Address,
        document_hash: DocumentHash,
    ) -> Result<&mut DocumentRecord, RegistryError> {
        let record = self
            .documents
            .get_mut(&document_hash)
            .ok_or(RegistryError::NotFound(document_hash))?;
        if record.owner != caller {
            return Err(RegistryError::NotOwner {
                document_hash,
                caller,
            });
        }
        Ok(record)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    pub fn pause(&mut self, caller: Address) -> Result<(), RegistryError> {
        self.access.ensure_role(Role::Pauser, caller)?;
        self.pause.engage()?;
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), RegistryError> {
        self.access.ensure_role(Role::Pauser, caller)?;
        self.pause.release()?;
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn get(&self, document_hash: &DocumentHash) -> Option<&DocumentRecord> {
        self.documents.get(document_hash)
    }

    /// Hashes currently owned by `owner`, ascending.
    #[must_use]
    pub fn documents_of(&self, owner: &Address) -> Vec<DocumentHash> {
        self.owner_index
            .get(owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of records ever created.
    #[must_use]
    pub fn document_count(&self) -> u64 {
        self.last_sequence
    }
}

/// Fails with `InvalidHash` on the zero hash.
pub fn validate_hash(document_hash: DocumentHash) -> Result<(), RegistryError> {
    if document_hash.is_zero() {
        Err(RegistryError::InvalidHash)
    } else {
        Ok(())
    }
}

fn mark_revoked(
    record: &mut DocumentRecord,
    revoked_by: Address,
    reason: &str,
    now: Timestamp,
) -> RevocationOutcome {
    if record.revocation.is_some() {
        return RevocationOutcome::AlreadyRevoked;
    }
    record.revocation = Some(Revocation {
        reason: reason.to_string(),
        revoked_by,
        revoked_at: now,
    });
    RevocationOutcome::Revoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AccessError, PauseError};

    const NOW: Timestamp = 1_700_000_000;

    fn deployer() -> Address {
        Address::repeat_byte(0xD0)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xB0)
    }

    fn hash(byte: u8) -> DocumentHash {
        DocumentHash::new([byte; 32])
    }

    fn state() -> RegistryState {
        RegistryState::new(deployer(), RegistryConfig::default())
    }

    #[test]
    fn test_register_then_verify() {
        let mut s = state();
        let record = s.register(alice(), hash(1), "PDF", NOW).unwrap();
        assert_eq!(record.owner, alice());
        assert_eq!(record.sequence, 1);
        assert!(s.verify(&hash(1), NOW));
        assert_eq!(s.documents_of(&alice()), vec![hash(1)]);
    }

    #[test]
    fn test_register_rejections() {
        let mut s = state();
        assert_eq!(
            s.register(alice(), DocumentHash::ZERO, "PDF", NOW),
            Err(RegistryError::InvalidHash)
        );
        assert!(matches!(
            s.register(alice(), hash(1), "", NOW),
            Err(RegistryError::InvalidDocumentType { len: 0, .. })
        ));
        s.register(alice(), hash(1), "PDF", NOW).unwrap();
        assert_eq!(
            s.register(bob(), hash(1), "PDF", NOW),
            Err(RegistryError::AlreadyExists(hash(1)))
        );
        assert_eq!(s.document_count(), 1);
    }

    #[test]
    fn test_batch_skips_instead_of_failing() {
        let mut s = state();
        s.register(alice(), hash(9), "PDF", NOW).unwrap();

        let hashes = vec![hash(1), hash(2), hash(1), DocumentHash::ZERO, hash(9), hash(3)];
        let types: Vec<String> = vec!["A", "B", "C", "D", "E", ""]
            .into_iter()
            .map(String::from)
            .collect();

        let outcome = s.batch_register(alice(), &hashes, &types, NOW).unwrap();
        assert_eq!(outcome.registered, vec![hash(1), hash(2)]);
        let reasons: Vec<_> = outcome.skipped.iter().map(|s| (s.index, s.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (2, SkipReason::DuplicateInBatch),
                (3, SkipReason::ZeroHash),
                (4, SkipReason::AlreadyRegistered),
                (5, SkipReason::InvalidDocumentType),
            ]
        );
        // First occurrence wins.
        assert_eq!(s.get(&hash(1)).unwrap().document_type, "A");
    }

    #[test]
    fn test_batch_whole_failures() {
        let mut s = state();
        assert_eq!(
            s.batch_register(alice(), &[hash(1)], &[], NOW),
            Err(RegistryError::LengthMismatch { hashes: 1, types: 0 })
        );

        let mut small = RegistryState::new(
            deployer(),
            RegistryConfig {
                max_batch_size: 2,
                ..RegistryConfig::default()
            },
        );
        let hashes = vec![hash(1), hash(2), hash(3)];
        let types = vec!["T".to_string(); 3];
        assert_eq!(
            small.batch_register(alice(), &hashes, &types, NOW),
            Err(RegistryError::BatchTooLarge { size: 3, max: 2 })
        );
        assert_eq!(small.document_count(), 0);
    }

    #[test]
    fn test_expiry_rules() {
        let mut s = state();
        s.register(alice(), hash(1), "PDF", NOW).unwrap();

        assert_eq!(
            s.set_expiry(alice(), hash(1), NOW, NOW),
            Err(RegistryError::InvalidExpiryDate {
                expires_at: NOW,
                now: NOW
            })
        );
        assert!(matches!(
            s.set_expiry(bob(), hash(1), NOW + 10, NOW),
            Err(RegistryError::NotOwner { .. })
        ));

        s.set_expiry(alice(), hash(1), NOW + 10, NOW).unwrap();
        assert!(s.verify(&hash(1), NOW + 9));
        assert!(!s.verify(&hash(1), NOW + 10));

        // Re-callable while live; may extend.
        s.set_expiry(alice(), hash(1), NOW + 100, NOW + 5).unwrap();
        assert!(s.verify(&hash(1), NOW + 20));
    }

    #[test]
    fn test_expired_document_cannot_be_revived() {
        let mut s = state();
        s.register(alice(), hash(1), "PDF", NOW).unwrap();
        s.set_expiry(alice(), hash(1), NOW + 10, NOW).unwrap();

        assert_eq!(
            s.set_expiry(alice(), hash(1), NOW + 5_000, NOW + 10),
            Err(RegistryError::DocumentExpired {
                document_hash: hash(1),
                expired_at: NOW + 10
            })
        );
        assert!(!s.verify(&hash(1), NOW + 10));
        assert!(!s.verify(&hash(1), NOW + 4_000));
        assert_eq!(s.get(&hash(1)).unwrap().expires_at, Some(NOW + 10));
    }

    #[test]
    fn test_revocation_is_monotonic() {
        let mut s = state();
        s.register(alice(), hash(1), "PDF", NOW).unwrap();

        assert_eq!(
            s.revoke(alice(), hash(1), "lost", NOW + 1),
            Ok(RevocationOutcome::Revoked)
        );
        assert_eq!(
            s.revoke(alice(), hash(1), "again", NOW + 2),
            Ok(RevocationOutcome::AlreadyRevoked)
        );
        let revocation = s.get(&hash(1)).unwrap().revocation.clone().unwrap();
        assert_eq!(revocation.reason, "lost");
        assert_eq!(revocation.revoked_at, NOW + 1);
        assert!(!s.verify(&hash(1), NOW + 2));

        // Key is not freed.
        assert_eq!(
            s.register(bob(), hash(1), "PDF", NOW + 3),
            Err(RegistryError::AlreadyExists(hash(1)))
        );
    }

    #[test]
    fn test_admin_revocation_roles() {
        let mut s = state();
        s.register(alice(), hash(1), "PDF", NOW).unwrap();

        assert!(matches!(
            s.revoke_as_admin(bob(), hash(1), "fraud", NOW),
            Err(RegistryError::Access(AccessError::MissingAnyRole { .. }))
        ));

        s.access_mut()
            .grant_role(deployer(), Role::DocumentManager, bob())
            .unwrap();
        assert_eq!(
            s.revoke_as_admin(bob(), hash(1), "fraud", NOW),
            Ok(RevocationOutcome::Revoked)
        );
        assert_eq!(
            s.revoke_as_admin(deployer(), hash(2), "fraud", NOW),
            Err(RegistryError::NotFound(hash(2)))
        );
    }

    #[test]
    fn test_transfer_ownership_updates_index() {
        let mut s = state();
        s.register(alice(), hash(1), "PDF", NOW).unwrap();
        s.set_expiry(alice(), hash(1), NOW + 50, NOW).unwrap();

        assert_eq!(
            s.transfer_ownership(alice(), hash(1), Address::ZERO),
            Err(RegistryError::InvalidRecipient)
        );
        assert_eq!(s.transfer_ownership(alice(), hash(1), bob()), Ok(alice()));
        assert!(s.documents_of(&alice()).is_empty());
        assert_eq!(s.documents_of(&bob()), vec![hash(1)]);
        assert_eq!(s.get(&hash(1)).unwrap().expires_at, Some(NOW + 50));

        // Old owner lost rights.
        assert!(matches!(
            s.update_metadata(alice(), hash(1), "x"),
            Err(RegistryError::NotOwner { .. })
        ));
        assert_eq!(s.update_metadata(bob(), hash(1), "x"), Ok(bob()));
    }

    #[test]
    fn test_metadata_limit() {
        let mut s = RegistryState::new(
            deployer(),
            RegistryConfig {
                max_metadata_len: 4,
                ..RegistryConfig::default()
            },
        );
        s.register(alice(), hash(1), "PDF", NOW).unwrap();
        assert_eq!(
            s.update_metadata(alice(), hash(1), "12345"),
            Err(RegistryError::MetadataTooLarge { len: 5, max: 4 })
        );
        assert_eq!(s.get(&hash(1)).unwrap().metadata, "");
    }

    #[test]
    fn test_pause_blocks_mutations_only() {
        let mut s = state();
        s.register(alice(), hash(1), "PDF", NOW).unwrap();
        s.pause(deployer()).unwrap();

        let paused = Err(RegistryError::Pause(PauseError::Paused));
        assert_eq!(s.register(alice(), hash(2), "PDF", NOW).map(|_| ()), paused);
        assert_eq!(s.update_metadata(alice(), hash(1), "m").map(|_| ()), paused);
        assert_eq!(s.revoke(alice(), hash(1), "r", NOW).map(|_| ()), paused);
        assert_eq!(
            s.batch_register(alice(), &[hash(3)], &["T".into()], NOW).map(|_| ()),
            paused
        );
        assert!(s.verify(&hash(1), NOW));

        assert_eq!(s.pause(deployer()), Err(RegistryError::Pause(PauseError::Paused)));
        assert!(matches!(
            s.unpause(alice()),
            Err(RegistryError::Access(AccessError::MissingRole { .. }))
        ));
        s.unpause(deployer()).unwrap();
        assert_eq!(
            s.unpause(deployer()),
            Err(RegistryError::Pause(PauseError::NotPaused))
        );
        assert!(s.register(alice(), hash(2), "PDF", NOW).is_ok());
    }
}
