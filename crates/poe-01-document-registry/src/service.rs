//! # Document Registry Service
//!
//! Wraps `RegistryState` with locking, the reentrancy guard, the clock and
//! event publication.
//!
//! ## Call Protocol (mutating entry points)
//!
//! 1. Enter the reentrancy guard (same-thread re-entry is refused).
//! 2. Take the state write lock; pause, role and owner checks and the
//!    transition happen under it.
//! 3. Release the write lock, then publish events while still inside the
//!    guard.
//!
//! Read-only queries take the read lock only.

use crate::domain::{
    validate_hash, BatchRegistration, DocumentRecord, RegistryConfig, RegistryError,
    RegistryState, RegistryStats, VerificationReport,
};
use crate::ports::inbound::{DocumentRegistryApi, DocumentVerifier};
use crate::ports::outbound::{EventPublisher, TimeSource};
use parking_lot::{Mutex, RwLock};
use shared_bus::LedgerEvent;
use shared_types::entities::{Address, DocumentHash, RevocationOutcome, Timestamp};
use shared_types::errors::{Categorized, ErrorCategory};
use shared_types::{ReentrancyGuard, ReentrancyLock, Role};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The Document Registry component.
pub struct DocumentRegistryService {
    /// Endpoint address of this instance.
    address: Address,
    state: RwLock<RegistryState>,
    guard: ReentrancyGuard,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn EventPublisher>,
    stats: Mutex<RegistryStats>,
}

impl DocumentRegistryService {
    /// Create a registry at `address`. `deployer` receives `Admin`,
    /// `DocumentManager` and `Pauser`.
    pub fn new(
        address: Address,
        deployer: Address,
        config: RegistryConfig,
        clock: Arc<dyn TimeSource>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        info!(%address, %deployer, "Document registry deployed");
        Self {
            address,
            state: RwLock::new(RegistryState::new(deployer, config)),
            guard: ReentrancyGuard::new(),
            clock,
            events,
            stats: Mutex::new(RegistryStats::default()),
        }
    }

    /// Get current registry statistics.
    pub fn stats(&self) -> RegistryStats {
        let mut stats = *self.stats.lock();
        stats.documents_registered = self.state.read().document_count();
        stats
    }

    /// Current registry configuration.
    pub fn config(&self) -> RegistryConfig {
        self.state.read().config().clone()
    }

    fn enter(
        &self,
        operation: &'static str,
        caller: Address,
    ) -> Result<ReentrancyLock<'_>, RegistryError> {
        self.guard
            .enter(operation)
            .map_err(|e| self.refuse(operation, caller, e.into()))
    }

    /// Applies `transition` under the write lock. The lock is released on return.
    fn mutate<T>(
        &self,
        operation: &'static str,
        caller: Address,
        transition: impl FnOnce(&mut RegistryState) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let result = transition(&mut self.state.write());
        result.map_err(|e| self.refuse(operation, caller, e))
    }

    fn refuse(
        &self,
        operation: &'static str,
        caller: Address,
        err: RegistryError,
    ) -> RegistryError {
        self.stats.lock().refused_operations += 1;
        let category = err.category();
        match category {
            ErrorCategory::Authorization | ErrorCategory::Availability => {
                warn!(operation, %caller, %category, error = %err, "Registry call refused");
            }
            _ => {
                debug!(operation, %caller, %category, error = %err, "Registry call rejected");
            }
        }
        err
    }

    fn publish(&self, event: LedgerEvent) {
        self.events.publish(self.address, event);
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl DocumentVerifier for DocumentRegistryService {
    fn verify_document(&self, document_hash: DocumentHash) -> bool {
        let now = self.now();
        self.state.read().verify(&document_hash, now)
    }
}

impl DocumentRegistryApi for DocumentRegistryService {
    #[instrument(skip(self, document_type), fields(registry = %self.address))]
    fn register(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        document_type: &str,
    ) -> Result<DocumentRecord, RegistryError> {
        let _entered = self.enter("register", caller)?;
        let now = self.now();
        let record = self.mutate("register", caller, |state| {
            state.register(caller, document_hash, document_type, now)
        })?;

        info!(
            hash = %document_hash,
            sequence = record.sequence,
            document_type,
            "Document registered"
        );
        self.publish(LedgerEvent::DocumentRegistered {
            document_hash,
            owner: caller,
            timestamp: now,
            document_type: record.document_type.clone(),
        });
        Ok(record)
    }

    #[instrument(
        skip_all,
        fields(registry = %self.address, caller = %caller, size = document_hashes.len())
    )]
    fn batch_register(
        &self,
        caller: Address,
        document_hashes: &[DocumentHash],
        document_types: &[String],
    ) -> Result<BatchRegistration, RegistryError> {
        let _entered = self.enter("batch_register", caller)?;
        let now = self.now();
        let outcome = self.mutate("batch_register", caller, |state| {
            state.batch_register(caller, document_hashes, document_types, now)
        })?;

        for skipped in &outcome.skipped {
            debug!(
                index = skipped.index,
                hash = %skipped.document_hash,
                reason = ?skipped.reason,
                "Batch element skipped"
            );
        }
        {
            let mut stats = self.stats.lock();
            stats.batch_elements_skipped += outcome.skipped.len() as u64;
            if !outcome.is_empty() {
                stats.batches_committed += 1;
            }
        }

        for (document_hash, document_type) in
            committed_types(&outcome, document_hashes, document_types)
        {
            self.publish(LedgerEvent::DocumentRegistered {
                document_hash,
                owner: caller,
                timestamp: now,
                document_type,
            });
        }

        info!(
            committed = outcome.count(),
            skipped = outcome.skipped.len(),
            "Batch registration applied"
        );
        self.publish(LedgerEvent::BatchDocumentsRegistered {
            owner: caller,
            count: outcome.count() as u64,
            timestamp: now,
        });
        Ok(outcome)
    }

    fn verify_document_detailed(&self, document_hash: DocumentHash) -> VerificationReport {
        let now = self.now();
        self.state.read().report(&document_hash, now)
    }

    fn batch_verify_documents(&self, document_hashes: &[DocumentHash]) -> Vec<bool> {
        let now = self.now();
        let state = self.state.read();
        document_hashes
            .iter()
            .map(|hash| state.verify(hash, now))
            .collect()
    }

    #[instrument(skip(self, metadata), fields(registry = %self.address, len = metadata.len()))]
    fn update_document_metadata(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        metadata: &str,
    ) -> Result<(), RegistryError> {
        let _entered = self.enter("update_document_metadata", caller)?;
        let owner = self.mutate("update_document_metadata", caller, |state| {
            state.update_metadata(caller, document_hash, metadata)
        })?;

        info!(hash = %document_hash, "Document metadata updated");
        self.publish(LedgerEvent::MetadataUpdated {
            document_hash,
            owner,
            metadata: metadata.to_string(),
        });
        Ok(())
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn set_document_expiry(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        expires_at: Timestamp,
    ) -> Result<(), RegistryError> {
        let _entered = self.enter("set_document_expiry", caller)?;
        let now = self.now();
        let owner = self.mutate("set_document_expiry", caller, |state| {
            state.set_expiry(caller, document_hash, expires_at, now)
        })?;

        info!(hash = %document_hash, expires_at, "Document expiry set");
        self.publish(LedgerEvent::DocumentExpirySet {
            document_hash,
            owner,
            expires_at,
        });
        Ok(())
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn revoke_document(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
    ) -> Result<RevocationOutcome, RegistryError> {
        let _entered = self.enter("revoke_document", caller)?;
        let now = self.now();
        let outcome = self.mutate("revoke_document", caller, |state| {
            state.revoke(caller, document_hash, reason, now)
        })?;
        self.after_revocation(caller, document_hash, reason, now, outcome);
        Ok(outcome)
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn revoke_document_by_admin(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
    ) -> Result<RevocationOutcome, RegistryError> {
        let _entered = self.enter("revoke_document_by_admin", caller)?;
        let now = self.now();
        let outcome = self.mutate("revoke_document_by_admin", caller, |state| {
            state.revoke_as_admin(caller, document_hash, reason, now)
        })?;
        self.after_revocation(caller, document_hash, reason, now, outcome);
        Ok(outcome)
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn transfer_document_ownership(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let _entered = self.enter("transfer_document_ownership", caller)?;
        let previous_owner = self.mutate("transfer_document_ownership", caller, |state| {
            state.transfer_ownership(caller, document_hash, new_owner)
        })?;

        info!(hash = %document_hash, %previous_owner, %new_owner, "Document ownership transferred");
        self.publish(LedgerEvent::DocumentOwnershipTransferred {
            document_hash,
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn pause(&self, caller: Address) -> Result<(), RegistryError> {
        let _entered = self.enter("pause", caller)?;
        self.mutate("pause", caller, |state| state.pause(caller))?;
        warn!(by = %caller, "Document registry paused");
        self.publish(LedgerEvent::Paused { by: caller });
        Ok(())
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn unpause(&self, caller: Address) -> Result<(), RegistryError> {
        let _entered = self.enter("unpause", caller)?;
        self.mutate("unpause", caller, |state| state.unpause(caller))?;
        info!(by = %caller, "Document registry unpaused");
        self.publish(LedgerEvent::Unpaused { by: caller });
        Ok(())
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn grant_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, RegistryError> {
        let _entered = self.enter("grant_role", caller)?;
        let changed = self.mutate("grant_role", caller, |state| {
            Ok(state.access_mut().grant_role(caller, role, account)?)
        })?;
        if changed {
            info!(%role, %account, "Role granted");
            self.publish(LedgerEvent::RoleGranted {
                role,
                account,
                granted_by: caller,
            });
        }
        Ok(changed)
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, RegistryError> {
        let _entered = self.enter("revoke_role", caller)?;
        let changed = self.mutate("revoke_role", caller, |state| {
            Ok(state.access_mut().revoke_role(caller, role, account)?)
        })?;
        if changed {
            info!(%role, %account, "Role revoked");
            self.publish(LedgerEvent::RoleRevoked {
                role,
                account,
                revoked_by: caller,
            });
        }
        Ok(changed)
    }

    #[instrument(skip(self), fields(registry = %self.address))]
    fn renounce_role(&self, caller: Address, role: Role) -> Result<bool, RegistryError> {
        let _entered = self.enter("renounce_role", caller)?;
        let changed = self.mutate("renounce_role", caller, |state| {
            Ok(state.access_mut().renounce_role(caller, role))
        })?;
        if changed {
            info!(%role, "Role renounced");
            self.publish(LedgerEvent::RoleRevoked {
                role,
                account: caller,
                revoked_by: caller,
            });
        }
        Ok(changed)
    }

    fn get_user_documents(&self, owner: Address) -> Vec<DocumentHash> {
        self.state.read().documents_of(&owner)
    }

    fn get_document(&self, document_hash: DocumentHash) -> Result<DocumentRecord, RegistryError> {
        self.state
            .read()
            .get(&document_hash)
            .cloned()
            .ok_or(RegistryError::NotFound(document_hash))
    }

    fn get_document_owner(&self, document_hash: DocumentHash) -> Result<Address, RegistryError> {
        self.state
            .read()
            .get(&document_hash)
            .map(|record| record.owner)
            .ok_or(RegistryError::NotFound(document_hash))
    }

    fn validate_document_hash(&self, document_hash: DocumentHash) -> Result<(), RegistryError> {
        validate_hash(document_hash)
    }

    fn has_role(&self, role: Role, account: Address) -> bool {
        self.state.read().access().has_role(role, account)
    }

    fn role_members(&self, role: Role) -> Vec<Address> {
        self.state.read().access().members(role)
    }

    fn document_count(&self) -> u64 {
        self.state.read().document_count()
    }

    fn is_paused(&self) -> bool {
        self.state.read().is_paused()
    }

    fn address(&self) -> Address {
        self.address
    }
}

impl DocumentRegistryService {
    fn after_revocation(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        reason: &str,
        now: Timestamp,
        outcome: RevocationOutcome,
    ) {
        if !outcome.is_new() {
            debug!(hash = %document_hash, "Document already revoked; original revocation kept");
            return;
        }
        self.stats.lock().documents_revoked += 1;
        info!(hash = %document_hash, revoked_by = %caller, reason, "Document revoked");
        self.publish(LedgerEvent::DocumentRevoked {
            document_hash,
            revoked_by: caller,
            reason: reason.to_string(),
            timestamp: now,
        });
    }
}

/// Pairs each committed hash with the type it was submitted with.
fn committed_types(
    outcome: &BatchRegistration,
    document_hashes: &[DocumentHash],
    document_types: &[String],
) -> Vec<(DocumentHash, String)> {
    let skipped: HashSet<usize> = outcome.skipped.iter().map(|s| s.index).collect();
    document_hashes
        .iter()
        .zip(document_types)
        .enumerate()
        .filter(|(index, _)| !skipped.contains(index))
        .map(|(_, (hash, document_type))| (*hash, document_type.clone()))
        .collect()
}
