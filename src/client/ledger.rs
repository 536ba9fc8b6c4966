//! Ledger Client
//!
//! The client's view of the shared ledger. Every call is one atomic ledger
//! transaction that either commits or returns an error; transport faults
//! are kept apart from protocol rejections so only the former get retried.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::instrument;

use crate::core::encoding::{IdentityCommitment, Nullifier};
use crate::ledger::error::ProtocolError;
use crate::ledger::events::LedgerEvent;
use crate::ledger::registry::ConfessionRegistry;
use crate::ledger::settlement::SettlementReport;
use crate::ledger::types::{
    Address, Bet, Comment, Confession, ConfessionFilter, ConfessionId, NullifierRecord, PlayerProfile,
    VoteType,
};
use crate::proof::dleq::EncodedProof;
use crate::proof::submission::SubmissionPublic;

/// Ledger call failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerClientError {
    /// The ledger executed the call and refused it.
    #[error("ledger rejected call: {0}")]
    Rejected(#[from] ProtocolError),

    /// The call did not reach the ledger, or the answer did not come back.
    /// A write that fails this way may still have committed.
    #[error("transport error: {0}")]
    Transport(String),

    /// No answer in time.
    #[error("ledger call timed out")]
    Timeout,
}

impl LedgerClientError {
    /// Worth retrying?
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }

    /// The protocol rejection, if that is what this is.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for ledger calls.
pub type LedgerResult<T> = Result<T, LedgerClientError>;

/// Atomic-transaction ledger collaborator.
pub trait LedgerClient: Send + Sync {
    /// Publish an identity commitment for `player`.
    fn register_player(
        &self,
        player: Address,
        identity_commitment: IdentityCommitment,
    ) -> impl Future<Output = LedgerResult<()>> + Send;

    /// Period the ledger currently accepts submissions for.
    fn current_period(&self) -> impl Future<Output = LedgerResult<u64>> + Send;

    /// Anchor a confession; returns its id.
    fn submit(
        &self,
        public: SubmissionPublic,
        proof: EncodedProof,
    ) -> impl Future<Output = LedgerResult<ConfessionId>> + Send;

    /// Cast a vote.
    fn vote(
        &self,
        voter: Address,
        confession_id: ConfessionId,
        vote: VoteType,
    ) -> impl Future<Output = LedgerResult<()>> + Send;

    /// Place a bet.
    fn place_bet(
        &self,
        bettor: Address,
        confession_id: ConfessionId,
        bet_real: bool,
        amount: i128,
    ) -> impl Future<Output = LedgerResult<()>> + Send;

    /// Prove authorship; bets on the confession settle in the same
    /// transaction.
    fn reveal(
        &self,
        caller: Address,
        confession_id: ConfessionId,
        proof: EncodedProof,
    ) -> impl Future<Output = LedgerResult<SettlementReport>> + Send;

    /// Comment on a confession.
    fn add_comment(
        &self,
        author: Address,
        confession_id: ConfessionId,
        text: String,
    ) -> impl Future<Output = LedgerResult<()>> + Send;

    /// One confession.
    fn get_confession(
        &self,
        confession_id: ConfessionId,
    ) -> impl Future<Output = LedgerResult<Option<Confession>>> + Send;

    /// Filtered page of confessions.
    fn query(&self, filter: ConfessionFilter) -> impl Future<Output = LedgerResult<Vec<Confession>>> + Send;

    /// Bets on a confession.
    fn get_bets(&self, confession_id: ConfessionId) -> impl Future<Output = LedgerResult<Vec<Bet>>> + Send;

    /// Comments on a confession.
    fn get_comments(
        &self,
        confession_id: ConfessionId,
    ) -> impl Future<Output = LedgerResult<Vec<Comment>>> + Send;

    /// A player's profile.
    fn get_player(&self, player: Address) -> impl Future<Output = LedgerResult<Option<PlayerProfile>>> + Send;

    /// Where a nullifier was spent, if it was.
    fn nullifier_record(
        &self,
        nullifier: Nullifier,
    ) -> impl Future<Output = LedgerResult<Option<NullifierRecord>>> + Send;

    /// Has `voter` voted on this confession?
    fn has_voted(&self, voter: Address, confession_id: ConfessionId) -> impl Future<Output = LedgerResult<bool>> + Send;
}

/// In-process ledger around a [`ConfessionRegistry`].
///
/// Each mutating call holds the write lock for its whole check-and-insert,
/// so calls are linearizable. Clones share the same registry.
#[derive(Clone, Debug)]
pub struct InMemoryLedger {
    registry: Arc<RwLock<ConfessionRegistry>>,
}

impl InMemoryLedger {
    /// Wrap a registry.
    pub fn new(registry: ConfessionRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }

    /// Close the round. Admin only.
    pub async fn end_round(&self, caller: &Address) -> LedgerResult<()> {
        Ok(self.registry.write().await.end_round(caller)?)
    }

    /// Reopen the round. Admin only.
    pub async fn start_round(&self, caller: &Address) -> LedgerResult<()> {
        Ok(self.registry.write().await.start_round(caller)?)
    }

    /// Has this nullifier been spent?
    pub async fn is_nullifier_used(&self, nullifier: &Nullifier) -> bool {
        self.registry.read().await.is_nullifier_used(nullifier)
    }

    /// Events with `seq >= from`.
    pub async fn events_since(&self, from: u64) -> Vec<LedgerEvent> {
        self.registry.read().await.events_since(from).to_vec()
    }
}

impl LedgerClient for InMemoryLedger {
    #[instrument(skip(self, identity_commitment), fields(player = %player))]
    async fn register_player(&self, player: Address, identity_commitment: IdentityCommitment) -> LedgerResult<()> {
        Ok(self.registry.write().await.register_player(&player, identity_commitment)?)
    }

    async fn current_period(&self) -> LedgerResult<u64> {
        Ok(self.registry.read().await.current_period())
    }

    #[instrument(skip_all, fields(nullifier = %public.nullifier.short()))]
    async fn submit(&self, public: SubmissionPublic, proof: EncodedProof) -> LedgerResult<ConfessionId> {
        Ok(self.registry.write().await.submit(&public, proof.as_bytes())?)
    }

    #[instrument(skip(self), fields(voter = %voter))]
    async fn vote(&self, voter: Address, confession_id: ConfessionId, vote: VoteType) -> LedgerResult<()> {
        Ok(self.registry.write().await.vote(&voter, confession_id, vote)?)
    }

    #[instrument(skip(self), fields(bettor = %bettor))]
    async fn place_bet(
        &self,
        bettor: Address,
        confession_id: ConfessionId,
        bet_real: bool,
        amount: i128,
    ) -> LedgerResult<()> {
        Ok(self
            .registry
            .write()
            .await
            .place_bet(&bettor, confession_id, bet_real, amount)?)
    }

    #[instrument(skip(self, proof), fields(caller = %caller))]
    async fn reveal(
        &self,
        caller: Address,
        confession_id: ConfessionId,
        proof: EncodedProof,
    ) -> LedgerResult<SettlementReport> {
        Ok(self
            .registry
            .write()
            .await
            .reveal(&caller, confession_id, proof.as_bytes())?)
    }

    #[instrument(skip(self, text), fields(author = %author))]
    async fn add_comment(&self, author: Address, confession_id: ConfessionId, text: String) -> LedgerResult<()> {
        Ok(self.registry.write().await.add_comment(&author, confession_id, &text)?)
    }

    async fn get_confession(&self, confession_id: ConfessionId) -> LedgerResult<Option<Confession>> {
        Ok(self.registry.read().await.get_confession(confession_id).cloned())
    }

    async fn query(&self, filter: ConfessionFilter) -> LedgerResult<Vec<Confession>> {
        Ok(self.registry.read().await.get_confessions(&filter))
    }

    async fn get_bets(&self, confession_id: ConfessionId) -> LedgerResult<Vec<Bet>> {
        Ok(self.registry.read().await.get_bets(confession_id))
    }

    async fn get_comments(&self, confession_id: ConfessionId) -> LedgerResult<Vec<Comment>> {
        Ok(self.registry.read().await.get_comments(confession_id))
    }

    async fn get_player(&self, player: Address) -> LedgerResult<Option<PlayerProfile>> {
        Ok(self.registry.read().await.get_player(&player).cloned())
    }

    async fn nullifier_record(&self, nullifier: Nullifier) -> LedgerResult<Option<NullifierRecord>> {
        Ok(self.registry.read().await.nullifier_record(&nullifier).cloned())
    }

    async fn has_voted(&self, voter: Address, confession_id: ConfessionId) -> LedgerResult<bool> {
        Ok(self.registry.read().await.has_voted(&voter, confession_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProtocolConfig;
    use crate::core::clock::ManualClock;
    use crate::core::hash::hash_content;
    use crate::identity::generate_secret;
    use crate::proof::submission::prove_submission;
    use rand_core::OsRng;
    use std::collections::BTreeSet;

    fn ledger() -> InMemoryLedger {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        InMemoryLedger::new(ConfessionRegistry::initialize(
            Address::new("GADMIN"),
            ProtocolConfig::default(),
            clock,
        ))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_submissions_one_winner() {
        let ledger = ledger();
        let period = ledger.current_period().await.unwrap();
        let s = generate_secret(&mut OsRng).unwrap();

        // same secret, same period: same nullifier, different content
        let a = prove_submission(&s, period, &hash_content("race a"), &mut OsRng).unwrap();
        let b = prove_submission(&s, period, &hash_content("race b"), &mut OsRng).unwrap();

        let la = ledger.clone();
        let lb = ledger.clone();
        let ta = tokio::spawn(async move { la.submit(a.public, a.proof).await });
        let tb = tokio::spawn(async move { lb.submit(b.public, b.proof).await });
        let results = [ta.await.unwrap(), tb.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(LedgerClientError::Rejected(ProtocolError::NullifierAlreadyUsed))
        )));
        assert_eq!(ledger.query(ConfessionFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_unique_ids() {
        let ledger = ledger();
        let period = ledger.current_period().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let s = generate_secret(&mut OsRng).unwrap();
                let out = prove_submission(&s, period, &hash_content(&format!("c{}", i)), &mut OsRng).unwrap();
                ledger.submit(out.public, out.proof).await
            }));
        }

        let mut ids = BTreeSet::new();
        for h in handles {
            ids.insert(h.await.unwrap().unwrap());
        }
        assert_eq!(ids, (1..=16).collect::<BTreeSet<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_same_caller() {
        let ledger = ledger();
        let period = ledger.current_period().await.unwrap();
        let s = generate_secret(&mut OsRng).unwrap();
        let out = prove_submission(&s, period, &hash_content("vote race"), &mut OsRng).unwrap();
        let id = ledger.submit(out.public, out.proof).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.vote(Address::new("GALICE"), id, VoteType::Relatable).await
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        let c = ledger.get_confession(id).await.unwrap().unwrap();
        assert_eq!(c.votes_relatable, 1);
    }

    #[tokio::test]
    async fn test_admin_round_calls() {
        let ledger = ledger();
        let err = ledger.end_round(&Address::new("GBOB")).await.unwrap_err();
        assert_eq!(err, LedgerClientError::Rejected(ProtocolError::Unauthorized));
        assert!(!err.is_transient());
        assert_eq!(err.protocol(), Some(&ProtocolError::Unauthorized));

        ledger.end_round(&Address::new("GADMIN")).await.unwrap();
        ledger.start_round(&Address::new("GADMIN")).await.unwrap();
        assert_eq!(ledger.events_since(0).await.len(), 2);
    }

    #[test]
    fn test_transient_classification() {
        assert!(LedgerClientError::Transport("reset".into()).is_transient());
        assert!(LedgerClientError::Timeout.is_transient());
        assert!(!LedgerClientError::Rejected(ProtocolError::InvalidProof).is_transient());
        assert_eq!(LedgerClientError::Timeout.protocol(), None);
    }
}
