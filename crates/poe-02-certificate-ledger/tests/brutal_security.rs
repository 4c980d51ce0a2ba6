//! # Brutal Security Tests for the Certificate Ledger (poe-02)
//!
//! These tests attempt to forge, steal and double-issue certificates.
//!
//! ## Test Categories
//!
//! 1. **Forgery** - Minting without a valid registry timestamp
//! 2. **Theft** - Transferring, burning or revoking someone else's token
//! 3. **Double Issuance** - Racing mints for the same document
//! 4. **Endpoint Abuse** - Unauthorized or zero registry swaps

use poe_01_document_registry::{DocumentRegistryApi, DocumentRegistryService, RegistryConfig};
use poe_02_certificate_ledger::{
    CertificateError, CertificateLedgerApi, CertificateLedgerService, InProcessRegistryGateway,
    LedgerConfig,
};
use rand::Rng;
use shared_bus::{EventPublisher, InMemoryEventBus};
use shared_types::{AccessError, Address, DocumentHash, ManualClock, Role};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

// =============================================================================
// TEST HELPERS
// =============================================================================

const START: u64 = 1_700_000_000;

fn deployer() -> Address {
    Address::repeat_byte(0xD0)
}

fn holder() -> Address {
    Address::repeat_byte(0x01)
}

fn attacker() -> Address {
    Address::repeat_byte(0x66)
}

fn registry_address() -> Address {
    Address::repeat_byte(0x11)
}

fn random_hash(rng: &mut impl Rng) -> DocumentHash {
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    bytes[0] |= 1;
    DocumentHash::new(bytes)
}

struct Deployment {
    registry: Arc<DocumentRegistryService>,
    ledger: Arc<CertificateLedgerService>,
    bus: Arc<InMemoryEventBus>,
}

fn deploy() -> Deployment {
    let bus = Arc::new(InMemoryEventBus::new());
    let clock = Arc::new(ManualClock::new(START));
    let registry = Arc::new(DocumentRegistryService::new(
        registry_address(),
        deployer(),
        RegistryConfig::default(),
        clock.clone(),
        bus.clone(),
    ));
    let gateway = Arc::new(InProcessRegistryGateway::new());
    gateway.register_endpoint(registry_address(), registry.clone());
    let ledger = Arc::new(
        CertificateLedgerService::new(
            Address::repeat_byte(0x22),
            deployer(),
            registry_address(),
            LedgerConfig::default(),
            gateway,
            clock,
            bus.clone(),
        )
        .unwrap(),
    );
    Deployment {
        registry,
        ledger,
        bus,
    }
}

fn timestamped_certificate(d: &Deployment, rng: &mut impl Rng) -> (DocumentHash, u64) {
    let hash = random_hash(rng);
    d.registry.register(holder(), hash, "PDF").unwrap();
    let id = d
        .ledger
        .mint_certificate(holder(), hash, "Diploma", "BSc")
        .unwrap();
    (hash, id)
}

// =============================================================================
// 1. FORGERY
// =============================================================================

#[test]
fn brutal_cannot_mint_unregistered_documents() {
    let d = deploy();
    let mut rng = rand::thread_rng();

    for _ in 0..32 {
        let hash = random_hash(&mut rng);
        assert_eq!(
            d.ledger.mint_certificate(attacker(), hash, "Diploma", "Fake"),
            Err(CertificateError::DocumentNotTimestamped(hash))
        );
    }
    assert_eq!(d.ledger.current_token_id(), 0);
    assert_eq!(d.bus.events_published(), 0);
}

#[test]
fn brutal_cannot_mint_revoked_document() {
    let d = deploy();
    let hash = random_hash(&mut rand::thread_rng());
    d.registry.register(holder(), hash, "PDF").unwrap();
    d.registry.revoke_document(holder(), hash, "leaked").unwrap();

    assert_eq!(
        d.ledger.mint_certificate(attacker(), hash, "Diploma", "Fake"),
        Err(CertificateError::DocumentNotTimestamped(hash))
    );
}

#[test]
fn brutal_zero_hash_and_zero_token_rejected() {
    let d = deploy();
    assert_eq!(
        d.ledger
            .mint_certificate(attacker(), DocumentHash::ZERO, "Diploma", "Fake"),
        Err(CertificateError::InvalidHash)
    );
    assert!(!d.ledger.verify_document_certificate(DocumentHash::ZERO, 0));
    assert_eq!(
        d.ledger.get_certificate_details(0),
        Err(CertificateError::InvalidTokenId)
    );
    assert_eq!(
        d.ledger.burn_certificate(attacker(), 0),
        Err(CertificateError::InvalidTokenId)
    );
}

#[test]
fn brutal_mismatched_hash_never_verifies() {
    let d = deploy();
    let mut rng = rand::thread_rng();
    let (_, id) = timestamped_certificate(&d, &mut rng);
    let (other, _) = timestamped_certificate(&d, &mut rng);

    assert!(!d.ledger.verify_document_certificate(other, id));
}

// =============================================================================
// 2. THEFT
// =============================================================================

#[test]
fn brutal_non_owner_cannot_move_or_burn() {
    let d = deploy();
    let (hash, id) = timestamped_certificate(&d, &mut rand::thread_rng());
    let events_before = d.bus.events_published();

    assert_eq!(
        d.ledger.transfer_certificate(attacker(), id, attacker()),
        Err(CertificateError::NotOwner {
            token_id: id,
            caller: attacker(),
        })
    );
    assert!(matches!(
        d.ledger.burn_certificate(attacker(), id),
        Err(CertificateError::NotOwner { .. })
    ));
    assert!(matches!(
        d.ledger.revoke_certificate(attacker(), id, "grief"),
        Err(CertificateError::Access(AccessError::MissingRole {
            role: Role::CertificateManager,
            ..
        }))
    ));

    assert_eq!(d.ledger.owner_of(id), Ok(holder()));
    assert!(d.ledger.verify_document_certificate(hash, id));
    assert_eq!(d.bus.events_published(), events_before);
}

#[test]
fn brutal_registry_owner_gains_nothing_on_ledger() {
    let d = deploy();
    let (hash, id) = timestamped_certificate(&d, &mut rand::thread_rng());

    // Registry ownership moves; the certificate does not follow.
    d.registry
        .transfer_document_ownership(holder(), hash, attacker())
        .unwrap();
    assert_eq!(d.ledger.owner_of(id), Ok(holder()));
    assert!(d.ledger.burn_certificate(attacker(), id).is_err());
}

#[test]
fn brutal_registry_roles_do_not_leak_into_ledger() {
    let d = deploy();
    d.registry
        .grant_role(deployer(), Role::Admin, attacker())
        .unwrap();

    assert!(!d.ledger.has_role(Role::Admin, attacker()));
    assert!(matches!(
        d.ledger.grant_role(attacker(), Role::CertificateManager, attacker()),
        Err(CertificateError::Access(_))
    ));
    assert!(matches!(
        d.ledger.pause(attacker()),
        Err(CertificateError::Access(_))
    ));
}

// =============================================================================
// 3. DOUBLE ISSUANCE
// =============================================================================

#[test]
fn brutal_racing_mints_issue_one_certificate() {
    let d = deploy();
    let hash = random_hash(&mut rand::thread_rng());
    d.registry.register(holder(), hash, "PDF").unwrap();

    let handles: Vec<_> = (0..16u8)
        .map(|i| {
            let ledger = Arc::clone(&d.ledger);
            thread::spawn(move || {
                ledger.mint_certificate(Address::repeat_byte(i + 1), hash, "Diploma", "BSc")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CertificateError::CertificateExists { .. })));
    assert_eq!(d.ledger.current_token_id(), 1);
    assert_eq!(d.ledger.get_certificate_by_document_hash(hash), Ok(1));
}

#[test]
fn brutal_token_ids_never_reused_after_burn() {
    let d = deploy();
    let mut rng = rand::thread_rng();
    let mut seen = HashSet::new();

    for _ in 0..20 {
        let (hash, id) = timestamped_certificate(&d, &mut rng);
        assert!(seen.insert(id));
        d.ledger.burn_certificate(holder(), id).unwrap();

        let reissued = d
            .ledger
            .mint_certificate(holder(), hash, "Diploma", "BSc")
            .unwrap();
        assert!(seen.insert(reissued));
        assert!(reissued > id);
    }
    assert_eq!(d.ledger.current_token_id(), 40);
}

// =============================================================================
// 4. ENDPOINT ABUSE
// =============================================================================

#[test]
fn brutal_unauthorized_registry_swap_rejected() {
    let d = deploy();
    let rogue = Address::repeat_byte(0x99);

    assert!(matches!(
        d.ledger.set_timestamp_registry(attacker(), rogue),
        Err(CertificateError::Access(AccessError::MissingRole {
            role: Role::RegistryManager,
            ..
        }))
    ));
    assert_eq!(
        d.ledger.set_timestamp_registry(deployer(), Address::ZERO),
        Err(CertificateError::InvalidRegistryEndpoint)
    );
    assert_eq!(d.ledger.timestamp_registry(), registry_address());
}

#[test]
fn brutal_swap_to_unknown_endpoint_fails_closed() {
    let d = deploy();
    let (hash, id) = timestamped_certificate(&d, &mut rand::thread_rng());
    d.ledger
        .set_timestamp_registry(deployer(), Address::repeat_byte(0x99))
        .unwrap();

    assert!(!d.ledger.verify_document_certificate(hash, id));
    assert!(matches!(
        d.ledger
            .mint_certificate(holder(), random_hash(&mut rand::thread_rng()), "Diploma", "BSc"),
        Err(CertificateError::RegistryUnavailable(_))
    ));
}
