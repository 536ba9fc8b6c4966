//! Reveal Circuit
//!
//! Proves `C == s·Hc` for the caller's registered identity `I = s·B`
//! (a DLEQ `log_B(I) == log_Hc(C)`), so only the holder of the secret behind
//! a commitment can claim it. The transcript binds the confession id and the
//! revealer's address, so an observed proof cannot be replayed on another
//! confession or by another account.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::encoding::{Commitment, ContentHash, IdentityCommitment};
use crate::core::hash::{commitment_base, Transcript};
use crate::identity::PlayerSecret;
use crate::ledger::types::{Address, ConfessionId};
use crate::proof::dleq::{decompress, DleqProof, DleqStatement, EncodedProof};
use crate::proof::error::{ProofGenerationError, ProofVerificationError};
use crate::proof::submission::derive_commitment;

/// Transcript domain for reveal proofs.
pub const REVEAL_DOMAIN: &[u8] = b"confession-box/reveal";

/// Public inputs of a reveal proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealPublic {
    /// Confession being claimed.
    pub confession_id: ConfessionId,
    /// Its content hash.
    pub content_hash: ContentHash,
    /// Its stored commitment.
    pub commitment: Commitment,
    /// Claimant's registered identity commitment.
    pub identity: IdentityCommitment,
    /// Claimant's ledger address.
    pub revealer: Address,
}

/// Proof plus the public inputs it was made for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutput {
    /// Public inputs.
    pub public: RevealPublic,
    /// Encoded proof.
    pub proof: EncodedProof,
}

fn transcript_for(public: &RevealPublic) -> Transcript {
    let mut t = Transcript::new(REVEAL_DOMAIN);
    t.append_u64(b"confession_id", public.confession_id);
    t.append_message(b"content_hash", public.content_hash.as_bytes());
    t.append_message(b"revealer", public.revealer.as_str().as_bytes());
    t
}

fn statement(identity: RistrettoPoint, content_hash: &ContentHash, commitment: RistrettoPoint) -> DleqStatement {
    DleqStatement {
        base_a: RISTRETTO_BASEPOINT_POINT,
        public_a: identity,
        base_b: commitment_base(content_hash),
        public_b: commitment,
    }
}

/// Run the reveal circuit.
///
/// Fails with [`ProofGenerationError::CommitmentMismatch`] when the secret
/// does not open `claimed_commitment` for `content_hash`; no proof is
/// produced in that case.
pub fn prove_reveal<R>(
    secret: &PlayerSecret,
    confession_id: ConfessionId,
    content_hash: &ContentHash,
    claimed_commitment: &Commitment,
    revealer: &Address,
    rng: &mut R,
) -> Result<RevealOutput, ProofGenerationError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    decompress(claimed_commitment.as_bytes(), "commitment")
        .map_err(|e| ProofGenerationError::MalformedInput(e.to_string()))?;

    if derive_commitment(secret, content_hash) != *claimed_commitment {
        warn!(confession_id, "secret does not open the claimed commitment");
        return Err(ProofGenerationError::CommitmentMismatch);
    }

    let s = secret.scalar();
    let identity = RistrettoPoint::mul_base(s);
    let public = RevealPublic {
        confession_id,
        content_hash: *content_hash,
        commitment: *claimed_commitment,
        identity: IdentityCommitment(identity.compress().to_bytes()),
        revealer: revealer.clone(),
    };
    let stmt = statement(identity, content_hash, s * commitment_base(content_hash));

    let proof = EncodedProof::from(DleqProof::prove(transcript_for(&public), &stmt, s, rng)?);

    verify_reveal(&public, proof.as_bytes()).map_err(|_| ProofGenerationError::SelfCheckFailed)?;

    debug!(confession_id, revealer = %revealer, "reveal proof generated");
    Ok(RevealOutput { public, proof })
}

/// Check a reveal proof against its public inputs.
pub fn verify_reveal(public: &RevealPublic, proof: &[u8]) -> Result<(), ProofVerificationError> {
    let proof = DleqProof::from_bytes(proof)?;

    let identity = decompress(public.identity.as_bytes(), "identity commitment")?;
    let commitment = decompress(public.commitment.as_bytes(), "commitment")?;
    let stmt = statement(identity, &public.content_hash, commitment);

    proof.verify(transcript_for(public), &stmt)
}
