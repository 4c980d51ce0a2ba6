//! # Certificate Ledger Service
//!
//! Wraps `LedgerState` with locking, the reentrancy guard, the registry
//! gateway, the clock and event publication.
//!
//! Mutating entry points follow the same protocol as the registry service:
//! guard, write lock, transition, unlock, publish. Mint consults the
//! registry gateway under the ledger's write lock so that the registry
//! answer and the new record belong to one atomic step.

use crate::domain::{
    CertificateError, CertificateRecord, LedgerConfig, LedgerState, LedgerStats, MintRequest,
};
use crate::ports::inbound::CertificateLedgerApi;
use crate::ports::outbound::{EventPublisher, RegistryGateway, TimeSource};
use parking_lot::{Mutex, RwLock};
use shared_bus::LedgerEvent;
use shared_types::entities::{Address, DocumentHash, RevocationOutcome, Timestamp, TokenId};
use shared_types::errors::{Categorized, ErrorCategory};
use shared_types::{ReentrancyGuard, ReentrancyLock, Role};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The Certificate Ledger component.
pub struct CertificateLedgerService {
    /// Endpoint address of this instance.
    address: Address,
    state: RwLock<LedgerState>,
    guard: ReentrancyGuard,
    gateway: Arc<dyn RegistryGateway>,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn EventPublisher>,
    stats: Mutex<LedgerStats>,
}

impl CertificateLedgerService {
    /// Create a ledger at `address` bound to the registry at `registry`.
    ///
    /// `deployer` receives `Admin`, `Pauser`, `RegistryManager` and
    /// `CertificateManager`. Fails on a zero `registry`.
    pub fn new(
        address: Address,
        deployer: Address,
        registry: Address,
        config: LedgerConfig,
        gateway: Arc<dyn RegistryGateway>,
        clock: Arc<dyn TimeSource>,
        events: Arc<dyn EventPublisher>,
    ) -> Result<Self, CertificateError> {
        let state = LedgerState::new(deployer, registry, config)?;
        info!(%address, %deployer, %registry, "Certificate ledger deployed");
        Ok(Self {
            address,
            state: RwLock::new(state),
            guard: ReentrancyGuard::new(),
            gateway,
            clock,
            events,
            stats: Mutex::new(LedgerStats::default()),
        })
    }

    /// Get current ledger statistics.
    pub fn stats(&self) -> LedgerStats {
        *self.stats.lock()
    }

    /// Current ledger configuration.
    pub fn config(&self) -> LedgerConfig {
        self.state.read().config().clone()
    }

    /// Number of live (unburned) certificates.
    pub fn live_certificates(&self) -> usize {
        self.state.read().live_count()
    }

    fn enter(
        &self,
        operation: &'static str,
        caller: Address,
    ) -> Result<ReentrancyLock<'_>, CertificateError> {
        self.guard
            .enter(operation)
            .map_err(|e| self.refuse(operation, caller, e.into()))
    }

    /// Applies `transition` under the write lock. The lock is released on return.
    fn mutate<T>(
        &self,
        operation: &'static str,
        caller: Address,
        transition: impl FnOnce(&mut LedgerState) -> Result<T, CertificateError>,
    ) -> Result<T, CertificateError> {
        let result = transition(&mut self.state.write());
        result.map_err(|e| self.refuse(operation, caller, e))
    }

    fn refuse(
        &self,
        operation: &'static str,
        caller: Address,
        err: CertificateError,
    ) -> CertificateError {
        {
            let mut stats = self.stats.lock();
            stats.refused_operations += 1;
            if let CertificateError::DocumentNotTimestamped(_) = err {
                stats.mints_without_timestamp += 1;
            }
        }
        let category = err.category();
        match category {
            ErrorCategory::Authorization | ErrorCategory::Availability => {
                warn!(operation, %caller, %category, error = %err, "Ledger call refused");
            }
            _ => {
                debug!(operation, %caller, %category, error = %err, "Ledger call rejected");
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

    fn record(&self, token_id: TokenId) -> Result<CertificateRecord, CertificateError> {
        self.state.read().get(token_id).cloned()
    }
}

impl CertificateLedgerApi for CertificateLedgerService {
    #[instrument(skip(self, document_type, document_name), fields(ledger = %self.address))]
    fn mint_certificate(
        &self,
        caller: Address,
        document_hash: DocumentHash,
        document_type: &str,
        document_name: &str,
    ) -> Result<TokenId, CertificateError> {
        let _entered = self.enter("mint_certificate", caller)?;
        let now = self.now();
        let request = MintRequest {
            document_hash,
            document_type,
            document_name,
        };
        let record = self.mutate("mint_certificate", caller, |state| {
            state.mint(caller, request, now, |registry, hash| {
                self.gateway.verify_document(registry, hash)
            })
        })?;

        self.stats.lock().certificates_minted += 1;
        info!(
            token_id = record.token_id,
            hash = %document_hash,
            registry = %record.issuing_registry,
            "Certificate minted"
        );
        self.publish(LedgerEvent::CertificateMinted {
            owner: caller,
            token_id: record.token_id,
            document_hash,
        });
        Ok(record.token_id)
    }

    fn verify_document_certificate(&self, document_hash: DocumentHash, token_id: TokenId) -> bool {
        if token_id == 0 {
            return false;
        }
        let (certified, registry) = {
            let state = self.state.read();
            let certified = state
                .get(token_id)
                .is_ok_and(|record| record.document_hash == document_hash && !record.is_revoked());
            (certified, state.registry())
        };
        if !certified {
            return false;
        }
        match self.gateway.verify_document(registry, document_hash) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(token_id, error = %e, "Registry unreachable during verification");
                false
            }
        }
    }

    fn verify_multiple_documents(&self, document_hashes: &[DocumentHash]) -> Vec<bool> {
        let registry = self.state.read().registry();
        self.gateway
            .verify_many(registry, document_hashes)
            .unwrap_or_else(|e| {
                debug!(error = %e, "Registry unreachable during batch verification");
                vec![false; document_hashes.len()]
            })
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn transfer_certificate(
        &self,
        caller: Address,
        token_id: TokenId,
        to: Address,
    ) -> Result<(), CertificateError> {
        let _entered = self.enter("transfer_certificate", caller)?;
        let from = self.mutate("transfer_certificate", caller, |state| {
            state.transfer(caller, token_id, to)
        })?;

        self.stats.lock().certificates_transferred += 1;
        info!(token_id, %from, %to, "Certificate transferred");
        self.publish(LedgerEvent::CertificateTransferred { from, to, token_id });
        Ok(())
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn burn_certificate(&self, caller: Address, token_id: TokenId) -> Result<(), CertificateError> {
        let _entered = self.enter("burn_certificate", caller)?;
        let burned = self.mutate("burn_certificate", caller, |state| {
            state.burn(caller, token_id)
        })?;

        self.stats.lock().certificates_burned += 1;
        info!(token_id, hash = %burned.document_hash, "Certificate burned");
        self.publish(LedgerEvent::CertificateBurned {
            owner: burned.owner,
            token_id,
        });
        Ok(())
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn revoke_certificate(
        &self,
        caller: Address,
        token_id: TokenId,
        reason: &str,
    ) -> Result<RevocationOutcome, CertificateError> {
        let _entered = self.enter("revoke_certificate", caller)?;
        let now = self.now();
        let outcome = self.mutate("revoke_certificate", caller, |state| {
            state.revoke(caller, token_id, reason, now)
        })?;

        if !outcome.is_new() {
            debug!(token_id, "Certificate already revoked; original revocation kept");
            return Ok(outcome);
        }
        self.stats.lock().certificates_revoked += 1;
        info!(token_id, revoked_by = %caller, reason, "Certificate revoked");
        self.publish(LedgerEvent::CertificateRevoked {
            token_id,
            revoked_by: caller,
            reason: reason.to_string(),
        });
        Ok(outcome)
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn set_timestamp_registry(
        &self,
        caller: Address,
        endpoint: Address,
    ) -> Result<(), CertificateError> {
        let _entered = self.enter("set_timestamp_registry", caller)?;
        let previous = self.mutate("set_timestamp_registry", caller, |state| {
            state.set_registry(caller, endpoint)
        })?;

        info!(%previous, current = %endpoint, "Timestamp registry updated");
        self.publish(LedgerEvent::RegistryUpdated {
            previous,
            current: endpoint,
        });
        Ok(())
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn pause(&self, caller: Address) -> Result<(), CertificateError> {
        let _entered = self.enter("pause", caller)?;
        self.mutate("pause", caller, |state| state.pause(caller))?;
        warn!(by = %caller, "Certificate ledger paused");
        self.publish(LedgerEvent::Paused { by: caller });
        Ok(())
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn unpause(&self, caller: Address) -> Result<(), CertificateError> {
        let _entered = self.enter("unpause", caller)?;
        self.mutate("unpause", caller, |state| state.unpause(caller))?;
        info!(by = %caller, "Certificate ledger unpaused");
        self.publish(LedgerEvent::Unpaused { by: caller });
        Ok(())
    }

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn grant_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, CertificateError> {
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

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn revoke_role(
        &self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<bool, CertificateError> {
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

    #[instrument(skip(self), fields(ledger = %self.address))]
    fn renounce_role(&self, caller: Address, role: Role) -> Result<bool, CertificateError> {
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

    fn get_certificate_by_document_hash(
        &self,
        document_hash: DocumentHash,
    ) -> Result<TokenId, CertificateError> {
        self.state.read().by_document(&document_hash)
    }

    fn get_certificate_details(
        &self,
        token_id: TokenId,
    ) -> Result<CertificateRecord, CertificateError> {
        self.record(token_id)
    }

    fn get_tokens_by_owner(&self, owner: Address) -> Vec<TokenId> {
        self.state.read().tokens_of(&owner)
    }

    fn owner_of(&self, token_id: TokenId) -> Result<Address, CertificateError> {
        self.state.read().get(token_id).map(|record| record.owner)
    }

    fn is_certificate_revoked(&self, token_id: TokenId) -> Result<bool, CertificateError> {
        self.state.read().get(token_id).map(CertificateRecord::is_revoked)
    }

    fn current_token_id(&self) -> TokenId {
        self.state.read().current_token_id()
    }

    fn token_uri(&self, token_id: TokenId) -> Result<String, CertificateError> {
        self.state.read().token_uri(token_id)
    }

    fn timestamp_registry(&self) -> Address {
        self.state.read().registry()
    }

    fn has_role(&self, role: Role, account: Address) -> bool {
        self.state.read().access().has_role(role, account)
    }

    fn role_members(&self, role: Role) -> Vec<Address> {
        self.state.read().access().members(role)
    }

    fn is_paused(&self) -> bool {
        self.state.read().is_paused()
    }

    fn address(&self) -> Address {
        self.address
    }
}
