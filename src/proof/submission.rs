//! Submission Circuit
//!
//! Given `(secret, period_salt, content_hash)` produces
//!
//! ```text
//! nullifier  N = s·P    P  = H2P("nullifier", period_salt)
//! commitment C = s·Hc   Hc = H2P("commitment", content_hash)
//! ```
//!
//! and a DLEQ proof that `log_P(N) == log_Hc(C)`. The proof shows a single
//! secret underlies both values; it does not reveal which one.
//!
//! `N` depends only on the secret and the period, so a second submission in
//! the same period collides on the nullifier whatever the content.

use serde::{Deserialize, Serialize};
use tracing::debug;

use curve25519_dalek::ristretto::RistrettoPoint;
use rand_core::{CryptoRng, RngCore};

use crate::core::encoding::{Commitment, ContentHash, Nullifier};
use crate::core::hash::{commitment_base, nullifier_base, Transcript};
use crate::identity::PlayerSecret;
use crate::proof::dleq::{decompress, DleqProof, DleqStatement, EncodedProof};
use crate::proof::error::{ProofGenerationError, ProofVerificationError};

/// Transcript domain for submission proofs.
pub const SUBMISSION_DOMAIN: &[u8] = b"confession-box/submission";

/// Nullifier for a secret in a period. Deterministic.
pub fn derive_nullifier(secret: &PlayerSecret, period_salt: u64) -> Nullifier {
    let point = secret.scalar() * nullifier_base(period_salt);
    Nullifier(point.compress().to_bytes())
}

/// Commitment binding a secret to a content hash. Deterministic.
pub fn derive_commitment(secret: &PlayerSecret, content_hash: &ContentHash) -> Commitment {
    let point = secret.scalar() * commitment_base(content_hash);
    Commitment(point.compress().to_bytes())
}

/// Public inputs of a submission proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPublic {
    /// Period the nullifier belongs to.
    pub period_salt: u64,
    /// Hash of the confession text.
    pub content_hash: ContentHash,
    /// Per-period nullifier.
    pub nullifier: Nullifier,
    /// Content commitment.
    pub commitment: Commitment,
}

/// Everything the ledger needs for `submit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutput {
    /// Public inputs.
    pub public: SubmissionPublic,
    /// Encoded proof.
    pub proof: EncodedProof,
}

fn transcript_for(period_salt: u64, content_hash: &ContentHash) -> Transcript {
    let mut t = Transcript::new(SUBMISSION_DOMAIN);
    t.append_u64(b"period_salt", period_salt);
    t.append_message(b"content_hash", content_hash.as_bytes());
    t
}

fn statement(base_n: RistrettoPoint, n: RistrettoPoint, base_c: RistrettoPoint, c: RistrettoPoint) -> DleqStatement {
    DleqStatement {
        base_a: base_n,
        public_a: n,
        base_b: base_c,
        public_b: c,
    }
}

/// Run the submission circuit.
///
/// The returned proof has already passed [`verify_submission`].
pub fn prove_submission<R>(
    secret: &PlayerSecret,
    period_salt: u64,
    content_hash: &ContentHash,
    rng: &mut R,
) -> Result<SubmissionOutput, ProofGenerationError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let s = secret.scalar();
    let base_n = nullifier_base(period_salt);
    let base_c = commitment_base(content_hash);
    let stmt = statement(base_n, s * base_n, base_c, s * base_c);

    let proof = DleqProof::prove(transcript_for(period_salt, content_hash), &stmt, s, rng)?;

    let public = SubmissionPublic {
        period_salt,
        content_hash: *content_hash,
        nullifier: Nullifier(stmt.public_a.compress().to_bytes()),
        commitment: Commitment(stmt.public_b.compress().to_bytes()),
    };
    let proof = EncodedProof::from(proof);

    verify_submission(&public, proof.as_bytes()).map_err(|_| ProofGenerationError::SelfCheckFailed)?;

    debug!(
        period = period_salt,
        nullifier = %public.nullifier.short(),
        commitment = %public.commitment.short(),
        "submission proof generated"
    );

    Ok(SubmissionOutput { public, proof })
}

/// Check a submission proof against its public inputs.
pub fn verify_submission(public: &SubmissionPublic, proof: &[u8]) -> Result<(), ProofVerificationError> {
    let proof = DleqProof::from_bytes(proof)?;

    let n = decompress(public.nullifier.as_bytes(), "nullifier")?;
    let c = decompress(public.commitment.as_bytes(), "commitment")?;
    let stmt = statement(
        nullifier_base(public.period_salt),
        n,
        commitment_base(&public.content_hash),
        c,
    );

    proof.verify(transcript_for(public.period_salt, &public.content_hash), &stmt)
}
