//! Confession Proof System
//!
//! Zero-knowledge proofs for anonymous submission and later reveal:
//! - Submission circuit: nullifier + commitment from one hidden secret
//! - Reveal circuit: a commitment was made with the caller's secret
//! - Pluggable ledger-side verification
//! - Cancellable background proof generation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  dleq.rs         - Chaum-Pedersen DLEQ, 64-byte encoding    │
//! │  submission.rs   - (secret, period, content) -> (N, C)      │
//! │  reveal.rs       - (secret, content, C) -> authorship proof │
//! │  verify.rs       - ProofVerifier trait for the ledger       │
//! │  task.rs         - spawn_blocking proof tasks               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod dleq;
pub mod error;
pub mod reveal;
pub mod submission;
pub mod task;
pub mod verify;

// Re-export key types
pub use dleq::{EncodedProof, PROOF_SIZE};
pub use error::{ProofGenerationError, ProofVerificationError};
pub use reveal::{prove_reveal, verify_reveal, RevealOutput, RevealPublic};
pub use submission::{
    derive_commitment, derive_nullifier, prove_submission, verify_submission,
    SubmissionOutput, SubmissionPublic,
};
pub use task::{spawn_reveal_proof, spawn_submission_proof, ProofTask, ProofTaskError};
pub use verify::{DleqVerifier, ProofVerifier};
