//! Verification API
//!
//! The registry checks proofs through [`ProofVerifier`]. [`DleqVerifier`]
//! is the built-in implementation; an external proof system plugs in by
//! implementing the trait over the same public inputs.

use crate::proof::error::ProofVerificationError;
use crate::proof::reveal::{verify_reveal, RevealPublic};
use crate::proof::submission::{verify_submission, SubmissionPublic};

/// Ledger-side proof verification.
pub trait ProofVerifier: Send + Sync {
    /// Check a submission proof.
    fn verify_submission(
        &self,
        public: &SubmissionPublic,
        proof: &[u8],
    ) -> Result<(), ProofVerificationError>;

    /// Check a reveal proof.
    fn verify_reveal(&self, public: &RevealPublic, proof: &[u8]) -> Result<(), ProofVerificationError>;

    /// Name for logs.
    fn name(&self) -> &'static str;
}

/// Chaum-Pedersen verifier over ristretto255.
#[derive(Clone, Copy, Debug, Default)]
pub struct DleqVerifier;

impl ProofVerifier for DleqVerifier {
    fn verify_submission(
        &self,
        public: &SubmissionPublic,
        proof: &[u8],
    ) -> Result<(), ProofVerificationError> {
        verify_submission(public, proof)
    }

    fn verify_reveal(&self, public: &RevealPublic, proof: &[u8]) -> Result<(), ProofVerificationError> {
        verify_reveal(public, proof)
    }

    fn name(&self) -> &'static str {
        "dleq-ristretto255"
    }
}
