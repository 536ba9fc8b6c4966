//! Retry with exponential backoff for ledger calls.
//!
//! Retries only transient transport failures (`Transport`, `Timeout`).
//! Protocol rejections describe ledger state and are returned immediately.
//!
//! A write whose reply was lost may have committed. Before replaying a
//! write, [`retry_write`] asks the ledger whether the earlier attempt went
//! through and, if so, returns its result instead of a guard rejection.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::client::ledger::{LedgerClient, LedgerClientError, LedgerResult};
use crate::config::RetryPolicy;
use crate::core::encoding::{IdentityCommitment, Nullifier};
use crate::ledger::settlement::SettlementReport;
use crate::ledger::types::{
    Address, Bet, Comment, Confession, ConfessionFilter, ConfessionId, NullifierRecord, PlayerProfile,
    VoteType,
};
use crate::proof::dleq::EncodedProof;
use crate::proof::submission::SubmissionPublic;

async fn attempt<T, Fut>(timeout: Option<Duration>, call: Fut) -> LedgerResult<T>
where
    Fut: Future<Output = LedgerResult<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(LedgerClientError::Timeout)),
        None => call.await,
    }
}

/// Run `f` until it succeeds, fails permanently, or the policy's retries
/// are used up. With a `timeout`, an attempt that takes longer counts as
/// [`LedgerClientError::Timeout`].
///
/// Only safe for reads. Writes go through [`retry_write`].
pub async fn retry_call<T, F, Fut>(
    op: &'static str,
    policy: &RetryPolicy,
    timeout: Option<Duration>,
    f: F,
) -> LedgerResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = LedgerResult<T>>,
{
    let mut retries = 0u32;
    loop {
        match attempt(timeout, f()).await {
            Err(e) if e.is_transient() && retries < policy.max_retries => {
                backoff(op, policy, &mut retries, &e).await;
            }
            other => return other,
        }
    }
}

/// [`retry_call`] for writes.
///
/// Before each replay, `committed` looks on the ledger for the effect of
/// the earlier attempts. `Some(result)` means one of them committed and
/// `result` is returned without writing again.
pub async fn retry_write<T, F, Fut, R, RFut>(
    op: &'static str,
    policy: &RetryPolicy,
    timeout: Option<Duration>,
    f: F,
    committed: R,
) -> LedgerResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = LedgerResult<T>>,
    R: Fn() -> RFut,
    RFut: Future<Output = LedgerResult<Option<T>>>,
{
    let mut retries = 0u32;
    loop {
        let result = if retries == 0 {
            attempt(timeout, f()).await
        } else {
            match attempt(timeout, committed()).await {
                Ok(Some(done)) => {
                    info!(op, retries, "earlier attempt had committed");
                    return Ok(done);
                }
                Ok(None) => attempt(timeout, f()).await,
                Err(e) => Err(e),
            }
        };

        match result {
            Err(e) if e.is_transient() && retries < policy.max_retries => {
                backoff(op, policy, &mut retries, &e).await;
            }
            other => return other,
        }
    }
}

async fn backoff(op: &'static str, policy: &RetryPolicy, retries: &mut u32, e: &LedgerClientError) {
    let delay = policy.delay_for(*retries);
    *retries += 1;
    warn!(
        op,
        attempt = *retries,
        max_retries = policy.max_retries,
        "ledger call failed, retrying in {delay:?}: {e}"
    );
    tokio::time::sleep(delay).await;
}

/// [`LedgerClient`] that retries transient failures of the wrapped client.
#[derive(Clone, Debug)]
pub struct RetryingLedger<C> {
    inner: C,
    policy: RetryPolicy,
    timeout: Option<Duration>,
}

impl<C: LedgerClient> RetryingLedger<C> {
    /// Wrap `inner` with a retry policy.
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            timeout: None,
        }
    }

    /// Bound every attempt by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn call<T, F, Fut>(&self, op: &'static str, f: F) -> LedgerResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        retry_call(op, &self.policy, self.timeout, f).await
    }

    async fn write<T, F, Fut, R, RFut>(&self, op: &'static str, f: F, committed: R) -> LedgerResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
        R: Fn() -> RFut,
        RFut: Future<Output = LedgerResult<Option<T>>>,
    {
        retry_write(op, &self.policy, self.timeout, f, committed).await
    }
}

impl<C: LedgerClient> LedgerClient for RetryingLedger<C> {
    async fn register_player(&self, player: Address, identity_commitment: IdentityCommitment) -> LedgerResult<()> {
        let (inner, player) = (&self.inner, &player);
        self.write(
            "register_player",
            move || inner.register_player(player.clone(), identity_commitment),
            move || {
                let profile = inner.get_player(player.clone());
                async move {
                    Ok(profile
                        .await?
                        .filter(|p| p.identity_commitment == identity_commitment)
                        .map(|_| ()))
                }
            },
        )
        .await
    }

    async fn current_period(&self) -> LedgerResult<u64> {
        self.call("current_period", || self.inner.current_period()).await
    }

    async fn submit(&self, public: SubmissionPublic, proof: EncodedProof) -> LedgerResult<ConfessionId> {
        let (inner, public) = (&self.inner, &public);
        self.write(
            "submit",
            move || inner.submit(public.clone(), proof),
            move || {
                let record = inner.nullifier_record(public.nullifier);
                let commitment = public.commitment;
                async move {
                    let Some(record) = record.await? else {
                        return Ok(None);
                    };
                    // the same nullifier with other content is a real double submission
                    let ours = inner
                        .get_confession(record.confession_id)
                        .await?
                        .is_some_and(|c| c.commitment == commitment);
                    Ok(ours.then_some(record.confession_id))
                }
            },
        )
        .await
    }

    async fn vote(&self, voter: Address, confession_id: ConfessionId, vote: VoteType) -> LedgerResult<()> {
        let (inner, voter) = (&self.inner, &voter);
        self.write(
            "vote",
            move || inner.vote(voter.clone(), confession_id, vote),
            move || {
                let voted = inner.has_voted(voter.clone(), confession_id);
                async move { Ok(voted.await?.then_some(())) }
            },
        )
        .await
    }

    async fn place_bet(
        &self,
        bettor: Address,
        confession_id: ConfessionId,
        bet_real: bool,
        amount: i128,
    ) -> LedgerResult<()> {
        let (inner, bettor) = (&self.inner, &bettor);
        self.write(
            "place_bet",
            move || inner.place_bet(bettor.clone(), confession_id, bet_real, amount),
            move || {
                let bets = inner.get_bets(confession_id);
                async move {
                    let placed = bets
                        .await?
                        .iter()
                        .any(|b| &b.bettor == bettor && b.bet_real == bet_real && b.amount == amount);
                    Ok(placed.then_some(()))
                }
            },
        )
        .await
    }

    async fn reveal(
        &self,
        caller: Address,
        confession_id: ConfessionId,
        proof: EncodedProof,
    ) -> LedgerResult<SettlementReport> {
        let (inner, caller) = (&self.inner, &caller);
        self.write(
            "reveal",
            move || inner.reveal(caller.clone(), confession_id, proof),
            move || {
                let confession = inner.get_confession(confession_id);
                async move {
                    let revealed_by_caller = confession
                        .await?
                        .is_some_and(|c| c.revealed && c.author.as_ref() == Some(caller));
                    if !revealed_by_caller {
                        return Ok(None);
                    }
                    // bets close at reveal, so every settled bet was settled by it
                    let settled = inner
                        .get_bets(confession_id)
                        .await?
                        .into_iter()
                        .filter_map(|b| b.outcome.map(|o| (b.bettor, o)))
                        .collect();
                    Ok(Some(SettlementReport { settled, skipped: 0 }))
                }
            },
        )
        .await
    }

    async fn add_comment(&self, author: Address, confession_id: ConfessionId, text: String) -> LedgerResult<()> {
        let (inner, author, text) = (&self.inner, &author, &text);
        self.write(
            "add_comment",
            move || inner.add_comment(author.clone(), confession_id, text.clone()),
            move || {
                let comments = inner.get_comments(confession_id);
                async move {
                    let posted = comments
                        .await?
                        .iter()
                        .any(|c| &c.author == author && c.text == text.trim());
                    Ok(posted.then_some(()))
                }
            },
        )
        .await
    }

    async fn get_confession(&self, confession_id: ConfessionId) -> LedgerResult<Option<Confession>> {
        self.call("get_confession", || self.inner.get_confession(confession_id))
            .await
    }

    async fn query(&self, filter: ConfessionFilter) -> LedgerResult<Vec<Confession>> {
        self.call("query", || self.inner.query(filter.clone())).await
    }

    async fn get_bets(&self, confession_id: ConfessionId) -> LedgerResult<Vec<Bet>> {
        self.call("get_bets", || self.inner.get_bets(confession_id)).await
    }

    async fn get_comments(&self, confession_id: ConfessionId) -> LedgerResult<Vec<Comment>> {
        self.call("get_comments", || self.inner.get_comments(confession_id))
            .await
    }

    async fn get_player(&self, player: Address) -> LedgerResult<Option<PlayerProfile>> {
        self.call("get_player", || self.inner.get_player(player.clone()))
            .await
    }

    async fn nullifier_record(&self, nullifier: Nullifier) -> LedgerResult<Option<NullifierRecord>> {
        self.call("nullifier_record", || self.inner.nullifier_record(nullifier))
            .await
    }

    async fn has_voted(&self, voter: Address, confession_id: ConfessionId) -> LedgerResult<bool> {
        self.call("has_voted", || self.inner.has_voted(voter.clone(), confession_id))
            .await
    }
}
