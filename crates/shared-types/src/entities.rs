//! # Core Domain Entities
//!
//! Primitive value types shared by the Document Registry and the
//! Certificate Ledger.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`
//! - **Content**: `DocumentHash`, `hash_document`
//! - **Ledger keys**: `TokenId`, `Timestamp`
//! - **Endpoints**: `compute_deployment_address`
//! - **Revocation**: `Revocation`, `RevocationOutcome`

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Certificate token identifier. Zero is never a valid id.
pub type TokenId = u64;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte opaque caller identity.
///
/// All owner, admin and role comparisons are plain equality on this value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Builds a test-friendly address whose every byte is `byte`.
    #[must_use]
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Self)
    }
}

// =============================================================================
// CLUSTER B: CONTENT
// =============================================================================

/// A 32-byte document content hash (Keccak-256 of the raw file bytes).
///
/// The all-zero value is never a valid registry key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DocumentHash(pub [u8; 32]);

impl DocumentHash {
    /// The zero hash. Rejected by every mutating entry point.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for DocumentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = hex::encode(self.0);
        write!(f, "0x{}...{}", &encoded[..8], &encoded[56..])
    }
}

impl From<[u8; 32]> for DocumentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for DocumentHash {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

/// Computes the Keccak-256 content hash of a document.
///
/// This is the reference implementation of the client-side hashing step.
/// The ledgers themselves only ever see the resulting digest.
#[must_use]
pub fn hash_document(contents: &[u8]) -> DocumentHash {
    DocumentHash(Keccak256::digest(contents).into())
}

// =============================================================================
// CLUSTER C: ENDPOINTS
// =============================================================================

/// Computes the endpoint address of a ledger instance deployed by `deployer`.
///
/// Address = keccak256(rlp(\[deployer, nonce\]))\[12:\]
#[must_use]
pub fn compute_deployment_address(deployer: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(32);

    // 0x80 + 20
    content.push(0x94);
    content.extend_from_slice(deployer.as_bytes());

    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 128 {
        content.push(nonce as u8);
    } else {
        let nonce_bytes = encode_nonce(nonce);
        content.push(0x80 + nonce_bytes.len() as u8);
        content.extend_from_slice(&nonce_bytes);
    }

    // Content is at most 31 bytes, so the short list header always applies.
    let mut rlp_data = Vec::with_capacity(content.len() + 1);
    rlp_data.push(0xc0 + content.len() as u8);
    rlp_data.extend_from_slice(&content);

    let hash = Keccak256::digest(&rlp_data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

/// Big-endian nonce bytes without leading zeros.
fn encode_nonce(nonce: u64) -> Vec<u8> {
    let bytes = nonce.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

// =============================================================================
// CLUSTER D: REVOCATION
// =============================================================================

/// A revocation mark. Once set on a record it is never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    pub reason: String,
    pub revoked_by: Address,
    pub revoked_at: Timestamp,
}

/// Result of a revocation request that passed authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationOutcome {
    /// The record was live and is now revoked.
    Revoked,
    /// The record was already revoked; the original mark was kept.
    AlreadyRevoked,
}

impl RevocationOutcome {
    #[must_use]
    pub const fn is_new(self) -> bool {
        matches!(self, RevocationOutcome::Revoked)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Errors parsing `0x`-prefixed hex into fixed-width values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHexError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded length did not match the expected width.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseHexError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(trimmed).map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| ParseHexError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}
