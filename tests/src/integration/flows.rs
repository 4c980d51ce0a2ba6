//! # Integration Test Flows
//!
//! The registry and the ledger deployed together, talking only through the
//! registry gateway, with every transition observed on the shared bus.
//!
//! ## Flows Tested
//!
//! 1. **Registry -> Ledger**: a certificate exists only for a timestamped document
//! 2. **Composite verification**: flips to false when either side revokes
//! 3. **Ledger bookkeeping**: owner sets and token ids across mint/transfer/burn
//! 4. **Endpoint swap**: the ledger follows a newly bound registry
//! 5. **Audit trail**: events reach filtered subscribers in commit order

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use rand::Rng;
    use tokio::time::timeout;

    use node_runtime::{LedgerContainer, NodeConfig};
    use poe_01_document_registry::{
        DocumentRegistryApi, DocumentRegistryService, DocumentVerifier, RegistryConfig,
        RegistryError, SkipReason,
    };
    use poe_02_certificate_ledger::{CertificateError, CertificateLedgerApi};
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use shared_types::{
        compute_deployment_address, hash_document, AccessError, Address, DocumentHash,
        ManualClock, RevocationOutcome, Role, TokenId,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const START: u64 = 1_700_000_000;

    fn deployer() -> Address {
        Address::repeat_byte(0xD0)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xB0)
    }

    fn deploy() -> (LedgerContainer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let container = LedgerContainer::with_clock(
            NodeConfig {
                deployer: deployer(),
                ..NodeConfig::default()
            },
            clock.clone(),
        )
        .unwrap();
        (container, clock)
    }

    fn random_hash() -> DocumentHash {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        bytes[0] |= 1;
        DocumentHash::new(bytes)
    }

    /// Register `hash` for `owner` and mint a certificate for it.
    fn timestamp_and_mint(
        container: &LedgerContainer,
        owner: Address,
        hash: DocumentHash,
    ) -> TokenId {
        container.registry.register(owner, hash, "PDF").unwrap();
        container
            .ledger
            .mint_certificate(owner, hash, "PDF", "contract.pdf")
            .unwrap()
    }

    // =============================================================================
    // REGISTRY -> LEDGER
    // =============================================================================

    #[test]
    fn test_registered_document_verifies() {
        let (container, _) = deploy();
        let hash = hash_document(b"lease agreement, signed");

        let record = container.registry.register(alice(), hash, "PDF").unwrap();
        assert_eq!(record.owner, alice());
        assert_eq!(record.registered_at, START);
        assert!(container.registry.verify_document(hash));

        let again = container.registry.register(bob(), hash, "PDF");
        assert!(matches!(again, Err(RegistryError::AlreadyExists(h)) if h == hash));
        assert_eq!(container.registry.get_document_owner(hash).unwrap(), alice());
    }

    #[test]
    fn test_verification_stays_false_after_revocation() {
        let (container, clock) = deploy();
        let hash = random_hash();
        container.registry.register(alice(), hash, "PDF").unwrap();

        let outcome = container
            .registry
            .revoke_document(alice(), hash, "superseded")
            .unwrap();
        assert_eq!(outcome, RevocationOutcome::Revoked);

        for _ in 0..5 {
            clock.advance(86_400);
            assert!(!container.registry.verify_document(hash));
        }
        assert!(matches!(
            container.registry.register(alice(), hash, "PDF"),
            Err(RegistryError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_verification_stays_false_after_expiry() {
        let (container, clock) = deploy();
        let hash = random_hash();
        container.registry.register(alice(), hash, "PDF").unwrap();
        container
            .registry
            .set_document_expiry(alice(), hash, START + 100)
            .unwrap();

        assert!(container.registry.verify_document(hash));
        clock.set(START + 100);
        assert!(!container.registry.verify_document(hash));
        clock.advance(1_000);
        assert!(!container.registry.verify_document(hash));

        let report = container.registry.verify_document_detailed(hash);
        assert!(report.exists);
        assert!(report.expired);
        assert!(!report.revoked);

        // A fresh expiry cannot bring the record back.
        assert!(matches!(
            container
                .registry
                .set_document_expiry(alice(), hash, START + 1_000_000),
            Err(RegistryError::DocumentExpired { expired_at, .. }) if expired_at == START + 100
        ));
        assert!(!container.registry.verify_document(hash));
        assert!(matches!(
            container
                .ledger
                .mint_certificate(alice(), hash, "PDF", "deed.pdf"),
            Err(CertificateError::DocumentNotTimestamped(_))
        ));
    }

    #[test]
    fn test_expired_document_cannot_revive_certificate() {
        let (container, clock) = deploy();
        let hash = random_hash();
        let token_id = timestamp_and_mint(&container, alice(), hash);
        container
            .registry
            .set_document_expiry(alice(), hash, START + 50)
            .unwrap();
        clock.advance(50);
        assert!(!container.ledger.verify_document_certificate(hash, token_id));

        assert!(container
            .registry
            .set_document_expiry(alice(), hash, START + 10_000)
            .is_err());
        assert!(!container.ledger.verify_document_certificate(hash, token_id));
    }

    #[test]
    fn test_mint_requires_timestamp() {
        let (container, _) = deploy();
        let hash = random_hash();

        let refused = container
            .ledger
            .mint_certificate(alice(), hash, "PDF", "deed.pdf");
        assert!(matches!(refused, Err(CertificateError::DocumentNotTimestamped(h)) if h == hash));
        assert_eq!(container.ledger.current_token_id(), 0);

        let token_id = timestamp_and_mint(&container, alice(), hash);
        assert_eq!(token_id, 1);
        assert_eq!(container.ledger.owner_of(token_id).unwrap(), alice());
        assert_eq!(
            container.ledger.get_certificate_by_document_hash(hash).unwrap(),
            token_id
        );

        let duplicate = container
            .ledger
            .mint_certificate(bob(), hash, "PDF", "deed.pdf");
        assert!(matches!(
            duplicate,
            Err(CertificateError::CertificateExists { token_id: 1, .. })
        ));
    }

    #[test]
    fn test_burn_frees_document_for_new_certificate() {
        let (container, _) = deploy();
        let hash = random_hash();
        let first = timestamp_and_mint(&container, alice(), hash);

        container.ledger.burn_certificate(alice(), first).unwrap();
        assert!(matches!(
            container.ledger.get_certificate_by_document_hash(hash),
            Err(CertificateError::NoCertificateForDocument(h)) if h == hash
        ));

        let second = container
            .ledger
            .mint_certificate(alice(), hash, "PDF", "contract.pdf")
            .unwrap();
        assert_eq!(second, first + 1);
        assert!(matches!(
            container.ledger.get_certificate_details(first),
            Err(CertificateError::NotFound(1))
        ));
    }

    #[test]
    fn test_mint_refused_for_expired_document() {
        let (container, clock) = deploy();
        let hash = random_hash();
        container.registry.register(alice(), hash, "PDF").unwrap();
        container
            .registry
            .set_document_expiry(alice(), hash, START + 10)
            .unwrap();
        clock.advance(10);

        assert!(matches!(
            container
                .ledger
                .mint_certificate(alice(), hash, "PDF", "deed.pdf"),
            Err(CertificateError::DocumentNotTimestamped(_))
        ));
        assert_eq!(container.ledger.stats().mints_without_timestamp, 1);
    }

    // =============================================================================
    // COMPOSITE VERIFICATION
    // =============================================================================

    #[test]
    fn test_certificate_revocation_flips_composite() {
        let (container, _) = deploy();
        let hash = random_hash();
        let token_id = timestamp_and_mint(&container, alice(), hash);
        assert!(container.ledger.verify_document_certificate(hash, token_id));

        container
            .ledger
            .revoke_certificate(deployer(), token_id, "issued in error")
            .unwrap();

        assert!(!container.ledger.verify_document_certificate(hash, token_id));
        // The registry record is untouched.
        assert!(container.registry.verify_document(hash));
        assert!(container.ledger.is_certificate_revoked(token_id).unwrap());
    }

    #[test]
    fn test_registry_revocation_flips_composite() {
        let (container, _) = deploy();
        let hash = random_hash();
        let token_id = timestamp_and_mint(&container, alice(), hash);

        container
            .registry
            .revoke_document_by_admin(deployer(), hash, "court order")
            .unwrap();

        assert!(!container.ledger.verify_document_certificate(hash, token_id));
        // The certificate itself is not marked.
        assert!(!container.ledger.is_certificate_revoked(token_id).unwrap());
        assert_eq!(container.ledger.owner_of(token_id).unwrap(), alice());
    }

    #[test]
    fn test_both_revoked_stays_false() {
        let (container, _) = deploy();
        let hash = random_hash();
        let token_id = timestamp_and_mint(&container, alice(), hash);

        container
            .registry
            .revoke_document(alice(), hash, "withdrawn")
            .unwrap();
        container
            .ledger
            .revoke_certificate(deployer(), token_id, "withdrawn")
            .unwrap();

        assert!(!container.ledger.verify_document_certificate(hash, token_id));
        let again = container
            .ledger
            .revoke_certificate(deployer(), token_id, "again")
            .unwrap();
        assert_eq!(again, RevocationOutcome::AlreadyRevoked);
    }

    #[test]
    fn test_composite_rejects_mismatched_pair() {
        let (container, _) = deploy();
        let h1 = random_hash();
        let h2 = random_hash();
        let t1 = timestamp_and_mint(&container, alice(), h1);
        let t2 = timestamp_and_mint(&container, alice(), h2);

        assert!(container.ledger.verify_document_certificate(h1, t1));
        assert!(!container.ledger.verify_document_certificate(h1, t2));
        assert!(!container.ledger.verify_document_certificate(h2, t1));
        assert!(!container.ledger.verify_document_certificate(h1, 0));
        assert!(!container.ledger.verify_document_certificate(h1, 999));
    }

    // =============================================================================
    // BATCH REGISTRATION
    // =============================================================================

    #[test]
    fn test_batch_commits_only_valid_elements() {
        let (container, _) = deploy();
        let h1 = random_hash();
        let h2 = random_hash();
        let hashes = vec![h1, h2, h1, DocumentHash::ZERO];
        let types = vec!["PDF".to_string(); 4];

        let outcome = container
            .registry
            .batch_register(alice(), &hashes, &types)
            .unwrap();

        assert_eq!(outcome.registered, vec![h1, h2]);
        let reasons: Vec<_> = outcome.skipped.iter().map(|s| (s.index, s.reason)).collect();
        assert_eq!(
            reasons,
            vec![(2, SkipReason::DuplicateInBatch), (3, SkipReason::ZeroHash)]
        );
        assert_eq!(
            container.registry.batch_verify_documents(&hashes),
            vec![true, true, true, false]
        );
        assert_eq!(
            container.ledger.verify_multiple_documents(&hashes),
            vec![true, true, true, false]
        );
    }

    // =============================================================================
    // LEDGER BOOKKEEPING
    // =============================================================================

    #[test]
    fn test_owner_sets_follow_transfers_and_burns() {
        let (container, _) = deploy();
        let tokens: Vec<TokenId> = (0..3)
            .map(|_| timestamp_and_mint(&container, alice(), random_hash()))
            .collect();

        container
            .ledger
            .transfer_certificate(alice(), tokens[0], bob())
            .unwrap();
        container
            .ledger
            .transfer_certificate(alice(), tokens[1], bob())
            .unwrap();
        container.ledger.burn_certificate(bob(), tokens[0]).unwrap();

        let tokens_of = |owner| -> HashSet<TokenId> {
            container.ledger.get_tokens_by_owner(owner).into_iter().collect()
        };
        let alice_tokens = tokens_of(alice());
        let bob_tokens = tokens_of(bob());
        assert_eq!(alice_tokens, HashSet::from([tokens[2]]));
        assert_eq!(bob_tokens, HashSet::from([tokens[1]]));
        assert!(alice_tokens.is_disjoint(&bob_tokens));

        for token_id in alice_tokens.iter().chain(bob_tokens.iter()) {
            let owner = container.ledger.owner_of(*token_id).unwrap();
            assert!(container.ledger.get_tokens_by_owner(owner).contains(token_id));
        }
        assert_eq!(container.ledger.live_certificates(), 2);
    }

    #[test]
    fn test_token_ids_strictly_increase() {
        let (container, _) = deploy();
        let mut last = container.ledger.current_token_id();

        for round in 0..20 {
            let token_id = timestamp_and_mint(&container, alice(), random_hash());
            assert!(token_id > last);
            last = token_id;
            if round % 3 == 0 {
                container.ledger.burn_certificate(alice(), token_id).unwrap();
            }
        }
        assert_eq!(container.ledger.current_token_id(), 20);
    }

    #[test]
    fn test_token_uri_is_deterministic() {
        let (container, _) = deploy();
        let token_id = timestamp_and_mint(&container, alice(), random_hash());

        let first = container.ledger.token_uri(token_id).unwrap();
        container
            .ledger
            .transfer_certificate(alice(), token_id, bob())
            .unwrap();
        let second = container.ledger.token_uri(token_id).unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with(&token_id.to_string()));
        assert!(first.starts_with(&container.config.ledger.token_uri_base));
        assert!(container.ledger.token_uri(token_id + 1).is_err());
    }

    // =============================================================================
    // ENDPOINT SWAP
    // =============================================================================

    #[test]
    fn test_ledger_follows_swapped_registry() {
        let (container, clock) = deploy();
        let hash = random_hash();
        container.registry.register(alice(), hash, "PDF").unwrap();

        let replacement_address = compute_deployment_address(deployer(), 2);
        let replacement = Arc::new(DocumentRegistryService::new(
            replacement_address,
            deployer(),
            RegistryConfig::default(),
            clock,
            container.event_bus.clone(),
        ));
        container
            .gateway
            .register_endpoint(replacement_address, replacement.clone());

        container
            .ledger
            .set_timestamp_registry(deployer(), replacement_address)
            .unwrap();
        assert_eq!(container.ledger.timestamp_registry(), replacement_address);

        // Known only to the old registry.
        assert!(matches!(
            container
                .ledger
                .mint_certificate(alice(), hash, "PDF", "deed.pdf"),
            Err(CertificateError::DocumentNotTimestamped(_))
        ));

        replacement.register(alice(), hash, "PDF").unwrap();
        let token_id = container
            .ledger
            .mint_certificate(alice(), hash, "PDF", "deed.pdf")
            .unwrap();
        assert_eq!(
            container
                .ledger
                .get_certificate_details(token_id)
                .unwrap()
                .issuing_registry,
            replacement_address
        );

        let swapped = container.event_bus.history().into_iter().any(|envelope| {
            matches!(
                envelope.event,
                LedgerEvent::RegistryUpdated { previous, current }
                    if previous == container.registry_address() && current == replacement_address
            )
        });
        assert!(swapped);
    }

    // =============================================================================
    // AUDIT TRAIL
    // =============================================================================

    #[tokio::test]
    async fn test_certificate_subscriber_sees_only_certificate_events() {
        let (container, _) = deploy();
        let mut certificates = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Certificates]));

        let hash = random_hash();
        let token_id = timestamp_and_mint(&container, alice(), hash);
        container
            .ledger
            .transfer_certificate(alice(), token_id, bob())
            .unwrap();

        let first = timeout(Duration::from_millis(100), certificates.recv())
            .await
            .expect("timeout waiting for mint")
            .expect("bus closed");
        assert_eq!(first.source, container.ledger_address());
        assert!(matches!(
            first.event,
            LedgerEvent::CertificateMinted { owner, token_id: 1, document_hash }
                if owner == alice() && document_hash == hash
        ));

        let second = timeout(Duration::from_millis(100), certificates.recv())
            .await
            .expect("timeout waiting for transfer")
            .expect("bus closed");
        assert!(matches!(
            second.event,
            LedgerEvent::CertificateTransferred { token_id: 1, .. }
        ));
        assert!(second.sequence > first.sequence);
        assert!(certificates.try_recv().unwrap().is_none());
    }

    #[test]
    fn test_refused_operations_publish_nothing() {
        let (container, _) = deploy();
        let before = container.event_bus.last_sequence();

        let unregistered = random_hash();
        assert!(matches!(
            container
                .ledger
                .mint_certificate(alice(), unregistered, "PDF", "x.pdf"),
            Err(CertificateError::DocumentNotTimestamped(h)) if h == unregistered
        ));
        assert_eq!(
            container.registry.register(alice(), DocumentHash::ZERO, "PDF"),
            Err(RegistryError::InvalidHash)
        );
        assert_eq!(
            container.ledger.pause(alice()),
            Err(CertificateError::Access(AccessError::MissingRole {
                account: alice(),
                role: Role::Pauser,
            }))
        );
        assert!(!container.ledger.is_paused());

        assert_eq!(container.event_bus.last_sequence(), before);
        assert_eq!(container.ledger.stats().refused_operations, 2);
        assert_eq!(container.registry.stats().refused_operations, 1);
    }
}
