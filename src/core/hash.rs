//! Protocol Hashing
//!
//! Provides deterministic hashing for:
//! - Content hashes (SHA-256 of confession plaintext)
//! - Hash-to-group bases for nullifiers and commitments
//! - Fiat-Shamir transcripts for the DLEQ proofs

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha256, Sha512};

use super::encoding::ContentHash;

/// Hash output type (256 bits / 32 bytes)
pub type Hash32 = [u8; 32];

/// Domain for the per-period nullifier base point.
pub const NULLIFIER_BASE_DOMAIN: &[u8] = b"CONFESSION_BOX_NULLIFIER_BASE_V1";

/// Domain for the per-content commitment base point.
pub const COMMITMENT_BASE_DOMAIN: &[u8] = b"CONFESSION_BOX_COMMITMENT_BASE_V1";

/// Hash confession plaintext into its on-ledger content hash.
pub fn hash_content(plaintext: &str) -> ContentHash {
    ContentHash(hash_bytes(plaintext.as_bytes()))
}

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Map bytes to a ristretto point with unknown discrete log.
pub fn hash_to_point(domain: &[u8], data: &[u8]) -> RistrettoPoint {
    let mut hasher = Sha512::new();
    hasher.update((domain.len() as u32).to_le_bytes());
    hasher.update(domain);
    hasher.update(data);
    RistrettoPoint::from_hash(hasher)
}

/// Base point for nullifiers in a given period.
pub fn nullifier_base(period_salt: u64) -> RistrettoPoint {
    hash_to_point(NULLIFIER_BASE_DOMAIN, &period_salt.to_le_bytes())
}

/// Base point for commitments to a given content hash.
pub fn commitment_base(content_hash: &ContentHash) -> RistrettoPoint {
    hash_to_point(COMMITMENT_BASE_DOMAIN, content_hash.as_bytes())
}

// =============================================================================
// FIAT-SHAMIR TRANSCRIPT
// =============================================================================

/// Running SHA-512 transcript.
///
/// Every append is length-prefixed and labelled, so two different sequences
/// of appends cannot produce the same state. Order of appends is part of
/// the statement.
#[derive(Clone)]
pub struct Transcript {
    hasher: Sha512,
}

impl Transcript {
    /// Create a transcript with a protocol domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(b"CONFESSION_BOX_TRANSCRIPT_V1");
        hasher.update((domain.len() as u32).to_le_bytes());
        hasher.update(domain);
        Self { hasher }
    }

    /// Append a labelled byte string.
    pub fn append_message(&mut self, label: &[u8], message: &[u8]) {
        self.hasher.update((label.len() as u32).to_le_bytes());
        self.hasher.update(label);
        self.hasher.update((message.len() as u32).to_le_bytes());
        self.hasher.update(message);
    }

    /// Append a u64 value (little-endian).
    #[inline]
    pub fn append_u64(&mut self, label: &[u8], value: u64) {
        self.append_message(label, &value.to_le_bytes());
    }

    /// Append a group element in compressed form.
    #[inline]
    pub fn append_point(&mut self, label: &[u8], point: &RistrettoPoint) {
        self.append_message(label, point.compress().as_bytes());
    }

    /// Derive a challenge scalar from everything appended so far.
    pub fn challenge_scalar(&self, label: &[u8]) -> Scalar {
        let mut hasher = self.hasher.clone();
        hasher.update(b"challenge");
        hasher.update((label.len() as u32).to_le_bytes());
        hasher.update(label);
        Scalar::from_hash(hasher)
    }

    /// Derive a hedged nonce: transcript state, the witness and fresh
    /// randomness all feed the nonce, so a weak RNG alone cannot leak the
    /// witness and a repeated statement still gets a fresh nonce.
    pub fn witness_nonce(&self, witness: &Scalar, fresh: &[u8; 32]) -> Scalar {
        let mut hasher = self.hasher.clone();
        hasher.update(b"nonce");
        hasher.update(witness.as_bytes());
        hasher.update(fresh);
        Scalar::from_hash(hasher)
    }
}

// =============================================================================
// TESTS
// =============================================================================
