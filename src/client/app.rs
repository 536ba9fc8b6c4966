//! Confession Client
//!
//! End-to-end player flow over a [`LedgerClient`]: identity, anonymous
//! submission, voting, betting, comments and authorship reveal. The session
//! secret stays inside this struct; proofs are generated on the blocking
//! pool and nothing reaches the ledger until a proof is ready.

use rand_core::OsRng;
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::content::ContentStore;
use crate::client::ledger::{LedgerClient, LedgerClientError};
use crate::identity::{IdentityError, PlayerSession};
use crate::ledger::error::ProtocolError;
use crate::ledger::settlement::SettlementReport;
use crate::ledger::types::{Address, Confession, ConfessionFilter, ConfessionId, VoteType};
use crate::proof::submission::SubmissionOutput;
use crate::proof::task::{spawn_reveal_proof, spawn_submission_proof, ProofTask, ProofTaskError};

/// Client-side failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Session identity problem.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Proof generation failed or was cancelled.
    #[error(transparent)]
    Proof(#[from] ProofTaskError),

    /// The ledger call failed.
    #[error(transparent)]
    Ledger(#[from] LedgerClientError),

    /// The ledger has no such confession.
    #[error("confession {0} not found")]
    ConfessionNotFound(ConfessionId),
}

/// A confession with its text, as shown in the feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    /// Ledger record.
    pub confession: Confession,
    /// Plaintext, if the content store has it.
    pub text: Option<String>,
    /// Submitted from this session.
    pub mine: bool,
}

/// One player's client.
#[derive(Debug)]
pub struct ConfessionClient<L, S> {
    ledger: L,
    content: S,
    address: Address,
    session: PlayerSession,
}

impl<L: LedgerClient, S: ContentStore> ConfessionClient<L, S> {
    /// Client for `address` with a fresh session.
    pub fn new(ledger: L, content: S, address: Address) -> Self {
        Self::with_session(ledger, content, address, PlayerSession::new())
    }

    /// Client around an existing session.
    pub fn with_session(ledger: L, content: S, address: Address, session: PlayerSession) -> Self {
        Self {
            ledger,
            content,
            address,
            session,
        }
    }

    /// Wallet address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Session state.
    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    /// Ledger handle.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Ids submitted from this session.
    pub fn my_confessions(&self) -> &[ConfessionId] {
        self.session.my_confessions()
    }

    /// Publish the session's identity commitment, creating the secret if
    /// needed. No-op once registered.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn register_if_needed(&mut self) -> Result<(), ClientError> {
        if self.session.is_registered() {
            return Ok(());
        }

        let commitment = self.session.ensure_secret(&mut OsRng)?.commitment();
        self.ledger
            .register_player(self.address.clone(), commitment)
            .await?;
        self.session.mark_registered();

        info!(commitment = %commitment.short(), "identity registered");
        Ok(())
    }

    /// Start proving a submission of `text` for the ledger's current period.
    ///
    /// The text is cached locally; the returned task can be cancelled
    /// without any ledger effect.
    pub async fn prepare_submission(&mut self, text: &str) -> Result<ProofTask<SubmissionOutput>, ClientError> {
        let secret = self.session.ensure_secret(&mut OsRng)?.clone();
        let period = self.ledger.current_period().await?;
        let content_hash = self.content.put(text);

        Ok(spawn_submission_proof(secret, period, content_hash))
    }

    /// Send a finished submission proof to the ledger.
    ///
    /// Fails with `PeriodMismatch` if the period ended while the proof was
    /// being made; prepare the submission again for the new period.
    pub async fn commit_submission(&mut self, output: SubmissionOutput) -> Result<ConfessionId, ClientError> {
        let id = self.ledger.submit(output.public, output.proof).await?;
        self.session.record_confession(id);
        info!(confession_id = id, "confession submitted");
        Ok(id)
    }

    /// Prove and submit a confession. Proves once more if the period rolled
    /// over while proving.
    #[instrument(skip(self, text), fields(address = %self.address))]
    pub async fn submit_confession(&mut self, text: &str) -> Result<ConfessionId, ClientError> {
        let output = self.prepare_submission(text).await?.join().await?;
        match self.commit_submission(output).await {
            Err(ClientError::Ledger(LedgerClientError::Rejected(ProtocolError::PeriodMismatch { expected, got }))) => {
                info!(expected, got, "period changed while proving, proving again");
                let output = self.prepare_submission(text).await?.join().await?;
                self.commit_submission(output).await
            }
            other => other,
        }
    }

    /// Vote on a confession.
    pub async fn vote(&self, confession_id: ConfessionId, vote: VoteType) -> Result<(), ClientError> {
        Ok(self.ledger.vote(self.address.clone(), confession_id, vote).await?)
    }

    /// Bet on whether a confession is real.
    pub async fn place_bet(&self, confession_id: ConfessionId, bet_real: bool, amount: i128) -> Result<(), ClientError> {
        Ok(self
            .ledger
            .place_bet(self.address.clone(), confession_id, bet_real, amount)
            .await?)
    }

    /// Comment on a confession.
    pub async fn add_comment(&self, confession_id: ConfessionId, text: &str) -> Result<(), ClientError> {
        Ok(self
            .ledger
            .add_comment(self.address.clone(), confession_id, text.to_string())
            .await?)
    }

    /// Prove authorship of a confession submitted with this session's
    /// secret. Registers the identity first if needed.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn reveal_authorship(&mut self, confession_id: ConfessionId) -> Result<SettlementReport, ClientError> {
        self.register_if_needed().await?;

        let confession = self
            .ledger
            .get_confession(confession_id)
            .await?
            .ok_or(ClientError::ConfessionNotFound(confession_id))?;
        let secret = self.session.secret()?.clone();

        let output = spawn_reveal_proof(
            secret,
            confession_id,
            confession.content_hash,
            confession.commitment,
            self.address.clone(),
        )
        .join()
        .await?;

        let report = self
            .ledger
            .reveal(self.address.clone(), confession_id, output.proof)
            .await?;
        info!(confession_id, settled = report.settled.len(), "authorship revealed");
        Ok(report)
    }

    /// A page of confessions joined with cached text.
    pub async fn feed(&self, filter: ConfessionFilter) -> Result<Vec<FeedItem>, ClientError> {
        let mine = self.session.my_confessions();
        let records = self.ledger.query(filter).await?;

        Ok(records
            .into_iter()
            .map(|confession| FeedItem {
                text: self.content.get(&confession.content_hash),
                mine: mine.contains(&confession.id),
                confession,
            })
            .collect())
    }

    /// Destroy the session secret. Confessions already submitted stay on
    /// the ledger but can no longer be revealed from this client.
    pub fn reset_identity(&mut self) {
        self.session.reset();
    }
}
