//! Proof errors.

use crate::core::entropy::EntropyError;

/// The prover could not produce a proof.
///
/// A failed generation never yields partial output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofGenerationError {
    /// The secret does not open the claimed commitment.
    #[error("secret does not match the claimed commitment")]
    CommitmentMismatch,

    /// A public input could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Nonce randomness was unavailable.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// The produced proof did not pass verification.
    #[error("generated proof failed self-check")]
    SelfCheckFailed,
}

/// A proof was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofVerificationError {
    /// Proof bytes have the wrong length or non-canonical scalars.
    #[error("invalid proof format")]
    InvalidProofFormat,

    /// A public input is not a valid group element (or is the identity).
    #[error("invalid public input: {0}")]
    InvalidPublicInput(&'static str),

    /// The proof equation does not hold.
    #[error("proof verification failed")]
    VerificationFailed,
}
