//! Background Proof Tasks
//!
//! Proof generation is the only CPU-heavy client operation. It runs on the
//! blocking pool behind a [`ProofTask`] handle so the calling flow can await
//! it, or abandon it. A cancelled task never yields its output; since
//! nothing reaches the ledger until the caller submits, abandoning a task has
//! no side effects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand_core::OsRng;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::core::encoding::{Commitment, ContentHash};
use crate::identity::PlayerSecret;
use crate::ledger::types::{Address, ConfessionId};
use crate::proof::error::ProofGenerationError;
use crate::proof::reveal::{prove_reveal, RevealOutput};
use crate::proof::submission::{prove_submission, SubmissionOutput};

/// Why a proof task produced no proof.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofTaskError {
    /// The caller cancelled the task.
    #[error("proof task cancelled")]
    Cancelled,

    /// The proving closure panicked.
    #[error("proof task panicked")]
    Panicked,

    /// The circuit rejected its inputs.
    #[error(transparent)]
    Proof(#[from] ProofGenerationError),
}

/// Handle to a proof being generated off the calling task.
#[derive(Debug)]
pub struct ProofTask<T> {
    id: Uuid,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<Option<Result<T, ProofGenerationError>>>,
}

impl<T: Send + 'static> ProofTask<T> {
    /// Run `prove` on the blocking pool. Must be called inside a tokio
    /// runtime.
    pub fn spawn<F>(label: &'static str, prove: F) -> Self
    where
        F: FnOnce() -> Result<T, ProofGenerationError> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = tokio::task::spawn_blocking(move || {
            if flag.load(Ordering::Acquire) {
                return None;
            }
            Some(prove())
        });

        debug!(%id, label, "proof task spawned");
        Self { id, cancelled, handle }
    }

    /// Job id, for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Abandon the task. A task already running on the pool finishes its
    /// computation, but the result is discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
        debug!(id = %self.id, "proof task cancelled");
    }

    /// Has [`ProofTask::cancel`] been called?
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait for the proof.
    pub async fn join(self) -> Result<T, ProofTaskError> {
        let joined = self.handle.await;

        if self.cancelled.load(Ordering::Acquire) {
            return Err(ProofTaskError::Cancelled);
        }

        match joined {
            Ok(Some(result)) => result.map_err(ProofTaskError::from),
            Ok(None) => Err(ProofTaskError::Cancelled),
            Err(e) if e.is_cancelled() => Err(ProofTaskError::Cancelled),
            Err(_) => Err(ProofTaskError::Panicked),
        }
    }
}

/// Generate a submission proof in the background with OS randomness.
pub fn spawn_submission_proof(
    secret: PlayerSecret,
    period_salt: u64,
    content_hash: ContentHash,
) -> ProofTask<SubmissionOutput> {
    ProofTask::spawn("submission", move || {
        prove_submission(&secret, period_salt, &content_hash, &mut OsRng)
    })
}

/// Generate a reveal proof in the background with OS randomness.
pub fn spawn_reveal_proof(
    secret: PlayerSecret,
    confession_id: ConfessionId,
    content_hash: ContentHash,
    commitment: Commitment,
    revealer: Address,
) -> ProofTask<RevealOutput> {
    ProofTask::spawn("reveal", move || {
        prove_reveal(&secret, confession_id, &content_hash, &commitment, &revealer, &mut OsRng)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::hash_content;
    use crate::identity::generate_secret;
    use crate::proof::submission::{derive_commitment, verify_submission};

    #[tokio::test]
    async fn test_submission_task_completes() {
        let s = generate_secret(&mut OsRng).unwrap();
        let task = spawn_submission_proof(s.clone(), 12, hash_content("bg"));
        assert!(!task.is_cancelled());

        let out = task.join().await.unwrap();
        assert!(verify_submission(&out.public, out.proof.as_bytes()).is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_task_yields_nothing() {
        let s = generate_secret(&mut OsRng).unwrap();
        let task = spawn_submission_proof(s, 12, hash_content("never mind"));
        task.cancel();
        assert!(task.is_cancelled());
        assert_eq!(task.join().await.unwrap_err(), ProofTaskError::Cancelled);
    }

    #[tokio::test]
    async fn test_circuit_error_propagates() {
        let s1 = generate_secret(&mut OsRng).unwrap();
        let s2 = generate_secret(&mut OsRng).unwrap();
        let h = hash_content("someone else's");

        let task = spawn_reveal_proof(s2, 1, h, derive_commitment(&s1, &h), Address::new("GBOB"));
        assert_eq!(
            task.join().await.unwrap_err(),
            ProofTaskError::Proof(ProofGenerationError::CommitmentMismatch)
        );
    }

    #[tokio::test]
    async fn test_panicking_task() {
        let task: ProofTask<()> = ProofTask::spawn("boom", || panic!("prover crashed"));
        assert_eq!(task.join().await.unwrap_err(), ProofTaskError::Panicked);
    }

    #[tokio::test]
    async fn test_task_ids_unique() {
        let a: ProofTask<u8> = ProofTask::spawn("a", || Ok(1));
        let b: ProofTask<u8> = ProofTask::spawn("b", || Ok(2));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.join().await.unwrap(), 1);
        assert_eq!(b.join().await.unwrap(), 2);
    }
}
