//! Nullifier Ledger and Confession Registry
//!
//! The authoritative state machine. Every mutating call checks all of its
//! preconditions before touching state, so a rejected call leaves the
//! registry exactly as it was. Callers that share a registry across tasks
//! must serialize mutations (see `client::ledger::InMemoryLedger`); the
//! nullifier check and the confession insert then happen as one step.
//!
//! ## Confession lifecycle
//!
//! ```text
//!   submit ──► Submitted ──reveal──► Revealed (terminal)
//!                 │   ▲                 │
//!                 └───┘ vote/bet        └── vote only; bets settled
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ProtocolConfig;
use crate::core::clock::{period_of, Clock};
use crate::core::encoding::{IdentityCommitment, Nullifier};
use crate::ledger::error::ProtocolError;
use crate::ledger::events::{LedgerEvent, LedgerEventData};
use crate::ledger::settlement::{settle_bets, SettlementReport, REVEAL_MEANS_REAL};
use crate::ledger::types::{
    Address, Bet, Comment, Confession, ConfessionFilter, ConfessionId, NullifierRecord,
    PlayerProfile, VoteType,
};
use crate::proof::reveal::RevealPublic;
use crate::proof::submission::SubmissionPublic;
use crate::proof::verify::{DleqVerifier, ProofVerifier};

/// First id handed out by a fresh registry.
pub const FIRST_CONFESSION_ID: ConfessionId = 1;

/// Ledger state.
pub struct ConfessionRegistry {
    /// May open and close rounds.
    admin: Address,
    /// Submissions and bets accepted?
    round_active: bool,
    /// Next sequential id.
    next_id: ConfessionId,
    config: ProtocolConfig,
    clock: Arc<dyn Clock>,
    verifier: Box<dyn ProofVerifier>,

    confessions: BTreeMap<ConfessionId, Confession>,
    nullifiers: BTreeMap<Nullifier, NullifierRecord>,
    /// (confession, voter) pairs that have voted.
    votes: BTreeSet<(ConfessionId, Address)>,
    bets: BTreeMap<(ConfessionId, Address), Bet>,
    comments: BTreeMap<ConfessionId, Vec<Comment>>,
    players: BTreeMap<Address, PlayerProfile>,
    /// Reverse index: one identity commitment per address.
    identities: BTreeMap<IdentityCommitment, Address>,
    events: Vec<LedgerEvent>,
}

impl std::fmt::Debug for ConfessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfessionRegistry")
            .field("admin", &self.admin)
            .field("round_active", &self.round_active)
            .field("next_id", &self.next_id)
            .field("verifier", &self.verifier.name())
            .field("confessions", &self.confessions.len())
            .field("players", &self.players.len())
            .finish()
    }
}

fn rejected(op: &'static str, err: ProtocolError) -> ProtocolError {
    warn!(op, code = err.code(), error = %err, "rejected");
    err
}

impl ConfessionRegistry {
    /// Create a ledger with an admin and an open round, verifying proofs
    /// with [`DleqVerifier`].
    pub fn initialize(admin: Address, config: ProtocolConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        info!(
            admin = %admin,
            period_secs = config.period_secs,
            now,
            "confession registry initialized"
        );

        Self {
            admin,
            round_active: true,
            next_id: FIRST_CONFESSION_ID,
            config,
            clock,
            verifier: Box::new(DleqVerifier),
            confessions: BTreeMap::new(),
            nullifiers: BTreeMap::new(),
            votes: BTreeSet::new(),
            bets: BTreeMap::new(),
            comments: BTreeMap::new(),
            players: BTreeMap::new(),
            identities: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Replace the proof verifier.
    pub fn with_verifier(mut self, verifier: Box<dyn ProofVerifier>) -> Self {
        debug!(verifier = verifier.name(), "proof verifier installed");
        self.verifier = verifier;
        self
    }

    fn emit(&mut self, data: LedgerEventData) {
        let event = LedgerEvent::new(self.events.len() as u64, self.clock.now(), data);
        debug!(seq = event.seq, kind = event.kind(), "ledger event");
        self.events.push(event);
    }

    // =========================================================================
    // PLAYERS & ROUNDS
    // =========================================================================

    /// Register `player`'s identity commitment.
    ///
    /// Registering the same commitment again is a no-op. A different
    /// commitment for the same player, or a commitment already held by
    /// another player, is `Unauthorized`.
    pub fn register_player(
        &mut self,
        player: &Address,
        identity_commitment: IdentityCommitment,
    ) -> Result<(), ProtocolError> {
        if let Some(profile) = self.players.get(player) {
            if profile.identity_commitment == identity_commitment {
                return Ok(());
            }
            return Err(rejected("register_player", ProtocolError::Unauthorized));
        }
        if self.identities.contains_key(&identity_commitment) {
            return Err(rejected("register_player", ProtocolError::Unauthorized));
        }

        self.players.insert(
            player.clone(),
            PlayerProfile {
                identity_commitment,
                reputation_score: 0,
                total_confessions: 0,
            },
        );
        self.identities.insert(identity_commitment, player.clone());

        info!(player = %player, commitment = %identity_commitment.short(), "player registered");
        self.emit(LedgerEventData::PlayerRegistered {
            player: player.clone(),
            identity_commitment,
        });
        Ok(())
    }

    fn set_round(&mut self, caller: &Address, active: bool) -> Result<(), ProtocolError> {
        if *caller != self.admin {
            return Err(rejected("set_round", ProtocolError::Unauthorized));
        }
        if self.round_active != active {
            self.round_active = active;
            info!(active, "round changed");
            self.emit(LedgerEventData::RoundChanged { active });
        }
        Ok(())
    }

    /// Close the round. Admin only.
    pub fn end_round(&mut self, caller: &Address) -> Result<(), ProtocolError> {
        self.set_round(caller, false)
    }

    /// Reopen the round. Admin only.
    pub fn start_round(&mut self, caller: &Address) -> Result<(), ProtocolError> {
        self.set_round(caller, true)
    }

    // =========================================================================
    // SUBMIT
    // =========================================================================

    /// Anchor an anonymous confession.
    ///
    /// Checks, in order: open round, current period, unused nullifier,
    /// valid proof. On success the nullifier is spent and the confession is
    /// stored under the next sequential id.
    pub fn submit(&mut self, public: &SubmissionPublic, proof: &[u8]) -> Result<ConfessionId, ProtocolError> {
        if !self.round_active {
            return Err(rejected("submit", ProtocolError::RoundNotActive));
        }

        let now = self.clock.now();
        let period = period_of(now, self.config.period_secs);
        if public.period_salt != period {
            return Err(rejected(
                "submit",
                ProtocolError::PeriodMismatch {
                    expected: period,
                    got: public.period_salt,
                },
            ));
        }

        if self.nullifiers.contains_key(&public.nullifier) {
            return Err(rejected("submit", ProtocolError::NullifierAlreadyUsed));
        }

        if let Err(e) = self.verifier.verify_submission(public, proof) {
            debug!(error = %e, "submission proof rejected");
            return Err(rejected("submit", ProtocolError::InvalidProof));
        }

        let id = self.next_id;
        self.next_id += 1;

        self.nullifiers.insert(
            public.nullifier,
            NullifierRecord {
                confession_id: id,
                period,
                timestamp: now,
            },
        );
        self.confessions.insert(
            id,
            Confession {
                id,
                content_hash: public.content_hash,
                commitment: public.commitment,
                nullifier: public.nullifier,
                period,
                revealed: false,
                author: None,
                timestamp: now,
                votes_relatable: 0,
                votes_shocking: 0,
                votes_fake: 0,
            },
        );

        info!(
            confession_id = id,
            period,
            nullifier = %public.nullifier.short(),
            "confession submitted"
        );
        self.emit(LedgerEventData::ConfessionSubmitted {
            confession_id: id,
            content_hash: public.content_hash,
            nullifier: public.nullifier,
            period,
        });
        Ok(id)
    }

    // =========================================================================
    // VOTE / BET / COMMENT
    // =========================================================================

    /// Count one vote. Each voter votes at most once per confession;
    /// voting stays open after reveal.
    pub fn vote(&mut self, voter: &Address, confession_id: ConfessionId, vote: VoteType) -> Result<(), ProtocolError> {
        let confession = self
            .confessions
            .get_mut(&confession_id)
            .ok_or(ProtocolError::ConfessionNotFound(confession_id))
            .map_err(|e| rejected("vote", e))?;

        // insert doubles as the check
        if !self.votes.insert((confession_id, voter.clone())) {
            return Err(rejected("vote", ProtocolError::AlreadyVoted(confession_id)));
        }
        confession.add_vote(vote);

        debug!(confession_id, voter = %voter, ?vote, "vote cast");
        self.emit(LedgerEventData::VoteCast {
            confession_id,
            voter: voter.clone(),
            vote,
        });
        Ok(())
    }

    /// Bet on whether a confession is real.
    pub fn place_bet(
        &mut self,
        bettor: &Address,
        confession_id: ConfessionId,
        bet_real: bool,
        amount: i128,
    ) -> Result<(), ProtocolError> {
        if !self.round_active {
            return Err(rejected("place_bet", ProtocolError::RoundNotActive));
        }

        let confession = self
            .confessions
            .get(&confession_id)
            .ok_or(ProtocolError::ConfessionNotFound(confession_id))
            .map_err(|e| rejected("place_bet", e))?;
        if confession.revealed {
            return Err(rejected("place_bet", ProtocolError::BetAlreadyClosed(confession_id)));
        }
        if amount <= 0 {
            return Err(rejected("place_bet", ProtocolError::InsufficientFunds));
        }

        let key = (confession_id, bettor.clone());
        if self.bets.contains_key(&key) {
            return Err(rejected("place_bet", ProtocolError::AlreadyBet(confession_id)));
        }

        self.bets.insert(
            key,
            Bet {
                bettor: bettor.clone(),
                confession_id,
                bet_real,
                amount,
                settled: false,
                outcome: None,
            },
        );

        info!(confession_id, bettor = %bettor, bet_real, amount, "bet placed");
        self.emit(LedgerEventData::BetPlaced {
            confession_id,
            bettor: bettor.clone(),
            bet_real,
            amount,
        });
        Ok(())
    }

    /// Append a comment.
    pub fn add_comment(&mut self, author: &Address, confession_id: ConfessionId, text: &str) -> Result<(), ProtocolError> {
        if !self.confessions.contains_key(&confession_id) {
            return Err(rejected("add_comment", ProtocolError::ConfessionNotFound(confession_id)));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(rejected("add_comment", ProtocolError::InvalidComment("empty".into())));
        }
        let len = text.chars().count();
        if len > self.config.max_comment_len {
            return Err(rejected(
                "add_comment",
                ProtocolError::InvalidComment(format!("{} chars, max {}", len, self.config.max_comment_len)),
            ));
        }

        let timestamp = self.clock.now();
        self.comments.entry(confession_id).or_default().push(Comment {
            author: author.clone(),
            text: text.to_string(),
            timestamp,
        });

        debug!(confession_id, author = %author, "comment added");
        self.emit(LedgerEventData::CommentAdded {
            confession_id,
            author: author.clone(),
        });
        Ok(())
    }

    // =========================================================================
    // REVEAL
    // =========================================================================

    /// Prove authorship of a confession and settle its bets.
    ///
    /// The proof is checked against the caller's registered identity and
    /// the confession's stored commitment and content hash, with the
    /// caller's address bound in.
    pub fn reveal(
        &mut self,
        caller: &Address,
        confession_id: ConfessionId,
        proof: &[u8],
    ) -> Result<SettlementReport, ProtocolError> {
        let confession = self
            .confessions
            .get(&confession_id)
            .ok_or(ProtocolError::ConfessionNotFound(confession_id))
            .map_err(|e| rejected("reveal", e))?;
        let identity = self
            .players
            .get(caller)
            .map(|p| p.identity_commitment)
            .ok_or(ProtocolError::PlayerNotRegistered)
            .map_err(|e| rejected("reveal", e))?;
        if confession.revealed {
            return Err(rejected("reveal", ProtocolError::Unauthorized));
        }

        let public = RevealPublic {
            confession_id,
            content_hash: confession.content_hash,
            commitment: confession.commitment,
            identity,
            revealer: caller.clone(),
        };
        if let Err(e) = self.verifier.verify_reveal(&public, proof) {
            debug!(error = %e, "reveal proof rejected");
            return Err(rejected("reveal", ProtocolError::InvalidProof));
        }

        // all checks passed; commit
        if let Some(confession) = self.confessions.get_mut(&confession_id) {
            confession.revealed = true;
            confession.author = Some(caller.clone());
        }
        if let Some(profile) = self.players.get_mut(caller) {
            profile.total_confessions = profile.total_confessions.saturating_add(1);
            profile.reputation_score = profile.reputation_score.saturating_add(1);
        }

        let open_bets = self
            .bets
            .range_mut((confession_id, Address(String::new()))..)
            .take_while(|((id, _), _)| *id == confession_id)
            .map(|(_, bet)| bet);
        let report = settle_bets(open_bets, confession_id, REVEAL_MEANS_REAL);

        info!(
            confession_id,
            author = %caller,
            bets_settled = report.settled.len(),
            "confession revealed"
        );
        self.emit(LedgerEventData::ConfessionRevealed {
            confession_id,
            author: caller.clone(),
        });
        for (bettor, outcome) in &report.settled {
            self.emit(LedgerEventData::BetSettled {
                confession_id,
                bettor: bettor.clone(),
                outcome: *outcome,
            });
        }

        Ok(report)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Admin address.
    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Is the round open?
    pub fn round_active(&self) -> bool {
        self.round_active
    }

    /// Period a submission made now must use.
    pub fn current_period(&self) -> u64 {
        period_of(self.clock.now(), self.config.period_secs)
    }

    /// Active configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Number of confessions stored.
    pub fn confession_count(&self) -> usize {
        self.confessions.len()
    }

    /// One confession.
    pub fn get_confession(&self, confession_id: ConfessionId) -> Option<&Confession> {
        self.confessions.get(&confession_id)
    }

    /// A page of confessions, ascending by id. The page size is capped at
    /// `max_page_size`.
    pub fn get_confessions(&self, filter: &ConfessionFilter) -> Vec<Confession> {
        let limit = filter.limit.min(self.config.max_page_size);
        self.confessions
            .values()
            .filter(|c| filter.matches(c))
            .skip(filter.offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Bets on a confession, ordered by bettor.
    pub fn get_bets(&self, confession_id: ConfessionId) -> Vec<Bet> {
        self.bets
            .range((confession_id, Address(String::new()))..)
            .take_while(|((id, _), _)| *id == confession_id)
            .map(|(_, bet)| bet.clone())
            .collect()
    }

    /// Comments on a confession, oldest first. Unknown ids have none.
    pub fn get_comments(&self, confession_id: ConfessionId) -> Vec<Comment> {
        self.comments.get(&confession_id).cloned().unwrap_or_default()
    }

    /// A registered player's profile.
    pub fn get_player(&self, player: &Address) -> Option<&PlayerProfile> {
        self.players.get(player)
    }

    /// Has this nullifier been spent?
    pub fn is_nullifier_used(&self, nullifier: &Nullifier) -> bool {
        self.nullifiers.contains_key(nullifier)
    }

    /// Ledger entry for a spent nullifier.
    pub fn nullifier_record(&self, nullifier: &Nullifier) -> Option<&NullifierRecord> {
        self.nullifiers.get(nullifier)
    }

    /// Has `voter` voted on this confession?
    pub fn has_voted(&self, voter: &Address, confession_id: ConfessionId) -> bool {
        self.votes.contains(&(confession_id, voter.clone()))
    }

    /// Events with `seq >= from`.
    pub fn events_since(&self, from: u64) -> &[LedgerEvent] {
        let start = (from as usize).min(self.events.len());
        &self.events[start..]
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::hash::hash_content;
    use crate::identity::{generate_secret, PlayerSecret};
    use crate::ledger::types::{BetOutcome, ConfessionStatus};
    use crate::proof::reveal::prove_reveal;
    use crate::proof::submission::{prove_submission, SubmissionOutput};
    use crate::proof::ProofVerificationError;
    use rand_core::OsRng;

    const T0: i64 = 1_700_000_000;

    struct Fixture {
        registry: ConfessionRegistry,
        clock: Arc<ManualClock>,
        admin: Address,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(T0));
        let admin = Address::new("GADMIN");
        let registry = ConfessionRegistry::initialize(admin.clone(), ProtocolConfig::default(), clock.clone());
        Fixture { registry, clock, admin }
    }

    fn secret() -> PlayerSecret {
        generate_secret(&mut OsRng).unwrap()
    }

    fn proof_for(reg: &ConfessionRegistry, s: &PlayerSecret, text: &str) -> SubmissionOutput {
        prove_submission(s, reg.current_period(), &hash_content(text), &mut OsRng).unwrap()
    }

    fn submit(reg: &mut ConfessionRegistry, s: &PlayerSecret, text: &str) -> Result<ConfessionId, ProtocolError> {
        let out = proof_for(reg, s, text);
        reg.submit(&out.public, out.proof.as_bytes())
    }

    fn reveal_as(
        reg: &mut ConfessionRegistry,
        who: &Address,
        s: &PlayerSecret,
        id: ConfessionId,
    ) -> Result<SettlementReport, ProtocolError> {
        let c = reg.get_confession(id).unwrap().clone();
        let out = prove_reveal(s, id, &c.content_hash, &c.commitment, who, &mut OsRng).unwrap();
        reg.reveal(who, id, out.proof.as_bytes())
    }

    #[test]
    fn test_submit_assigns_sequential_ids() {
        let mut f = fixture();
        assert_eq!(submit(&mut f.registry, &secret(), "a"), Ok(1));
        assert_eq!(submit(&mut f.registry, &secret(), "b"), Ok(2));
        assert_eq!(f.registry.confession_count(), 2);

        let c = f.registry.get_confession(2).unwrap();
        assert_eq!(c.content_hash, hash_content("b"));
        assert_eq!(c.status(), ConfessionStatus::Submitted);
        assert_eq!(c.author, None);
        assert_eq!(c.timestamp, T0);
    }

    #[test]
    fn test_double_submission_same_period() {
        let mut f = fixture();
        let s = secret();
        submit(&mut f.registry, &s, "first").unwrap();

        assert_eq!(
            submit(&mut f.registry, &s, "different content"),
            Err(ProtocolError::NullifierAlreadyUsed)
        );
        assert_eq!(f.registry.confession_count(), 1);
    }

    #[test]
    fn test_next_period_allows_new_submission() {
        let mut f = fixture();
        let s = secret();
        submit(&mut f.registry, &s, "today").unwrap();

        f.clock.advance(86_400);
        assert_eq!(submit(&mut f.registry, &s, "tomorrow"), Ok(2));
    }

    #[test]
    fn test_stale_period_rejected() {
        let mut f = fixture();
        let s = secret();
        let out = proof_for(&f.registry, &s, "late");
        let period = out.public.period_salt;

        f.clock.advance(86_400);
        assert_eq!(
            f.registry.submit(&out.public, out.proof.as_bytes()),
            Err(ProtocolError::PeriodMismatch {
                expected: period + 1,
                got: period,
            })
        );
        assert!(!f.registry.is_nullifier_used(&out.public.nullifier));
    }

    #[test]
    fn test_bad_proof_spends_nothing() {
        let mut f = fixture();
        let out = proof_for(&f.registry, &secret(), "forged");

        assert_eq!(
            f.registry.submit(&out.public, &[1u8; 64]),
            Err(ProtocolError::InvalidProof)
        );
        assert!(!f.registry.is_nullifier_used(&out.public.nullifier));
        assert_eq!(f.registry.confession_count(), 0);
        assert!(f.registry.events_since(0).is_empty());
    }

    #[test]
    fn test_nullifier_record() {
        let mut f = fixture();
        let out = proof_for(&f.registry, &secret(), "x");
        f.registry.submit(&out.public, out.proof.as_bytes()).unwrap();

        let record = f.registry.nullifier_record(&out.public.nullifier).unwrap();
        assert_eq!(record.confession_id, 1);
        assert_eq!(record.period, f.registry.current_period());
    }

    #[test]
    fn test_vote_uniqueness() {
        let mut f = fixture();
        let id = submit(&mut f.registry, &secret(), "vote on me").unwrap();
        let alice = Address::new("GALICE");
        let bob = Address::new("GBOB");

        f.registry.vote(&alice, id, VoteType::Relatable).unwrap();
        assert_eq!(
            f.registry.vote(&alice, id, VoteType::Fake),
            Err(ProtocolError::AlreadyVoted(id))
        );
        f.registry.vote(&bob, id, VoteType::Fake).unwrap();

        let c = f.registry.get_confession(id).unwrap();
        assert_eq!(c.votes_relatable, 1);
        assert_eq!(c.votes_fake, 1);
        assert!(f.registry.has_voted(&alice, id));
    }

    #[test]
    fn test_vote_unknown_confession() {
        let mut f = fixture();
        assert_eq!(
            f.registry.vote(&Address::new("GALICE"), 99, VoteType::Shocking),
            Err(ProtocolError::ConfessionNotFound(99))
        );
        assert!(!f.registry.has_voted(&Address::new("GALICE"), 99));
    }

    #[test]
    fn test_bet_guards() {
        let mut f = fixture();
        let id = submit(&mut f.registry, &secret(), "bet on me").unwrap();
        let bob = Address::new("GBOB");

        assert_eq!(
            f.registry.place_bet(&bob, 42, true, 10),
            Err(ProtocolError::ConfessionNotFound(42))
        );
        assert_eq!(f.registry.place_bet(&bob, id, true, 0), Err(ProtocolError::InsufficientFunds));
        assert_eq!(f.registry.place_bet(&bob, id, true, -5), Err(ProtocolError::InsufficientFunds));

        f.registry.place_bet(&bob, id, true, 10).unwrap();
        assert_eq!(
            f.registry.place_bet(&bob, id, false, 10),
            Err(ProtocolError::AlreadyBet(id))
        );
        assert_eq!(f.registry.get_bets(id).len(), 1);
    }

    #[test]
    fn test_reveal_settles_and_closes_betting() {
        let mut f = fixture();
        let author = Address::new("GAUTHOR");
        let s = secret();
        f.registry.register_player(&author, s.commitment()).unwrap();
        let id = submit(&mut f.registry, &s, "it was me").unwrap();

        let believer = Address::new("GBELIEVER");
        let skeptic = Address::new("GSKEPTIC");
        f.registry.place_bet(&believer, id, true, 50).unwrap();
        f.registry.place_bet(&skeptic, id, false, 70).unwrap();

        let report = reveal_as(&mut f.registry, &author, &s, id).unwrap();
        assert_eq!(report.settled.len(), 2);

        let c = f.registry.get_confession(id).unwrap();
        assert!(c.revealed);
        assert_eq!(c.author, Some(author.clone()));

        let bets = f.registry.get_bets(id);
        assert!(bets.iter().all(|b| b.settled));
        let outcome_of = |who: &Address| bets.iter().find(|b| &b.bettor == who).unwrap().outcome;
        assert_eq!(outcome_of(&believer), Some(BetOutcome::Won));
        assert_eq!(outcome_of(&skeptic), Some(BetOutcome::Lost));

        assert_eq!(
            f.registry.place_bet(&Address::new("GLATE"), id, true, 1),
            Err(ProtocolError::BetAlreadyClosed(id))
        );

        let profile = f.registry.get_player(&author).unwrap();
        assert_eq!(profile.total_confessions, 1);
        assert_eq!(profile.reputation_score, 1);
    }

    #[test]
    fn test_reveal_does_not_touch_other_bets() {
        let mut f = fixture();
        let author = Address::new("GAUTHOR");
        let s = secret();
        f.registry.register_player(&author, s.commitment()).unwrap();
        let mine = submit(&mut f.registry, &s, "mine").unwrap();
        let other = submit(&mut f.registry, &secret(), "other").unwrap();

        let bob = Address::new("GBOB");
        f.registry.place_bet(&bob, mine, true, 1).unwrap();
        f.registry.place_bet(&bob, other, true, 1).unwrap();

        reveal_as(&mut f.registry, &author, &s, mine).unwrap();
        assert!(f.registry.get_bets(mine)[0].settled);
        assert!(!f.registry.get_bets(other)[0].settled);
    }

    #[test]
    fn test_reveal_is_terminal() {
        let mut f = fixture();
        let author = Address::new("GAUTHOR");
        let s = secret();
        f.registry.register_player(&author, s.commitment()).unwrap();
        let id = submit(&mut f.registry, &s, "once").unwrap();

        reveal_as(&mut f.registry, &author, &s, id).unwrap();
        assert_eq!(reveal_as(&mut f.registry, &author, &s, id), Err(ProtocolError::Unauthorized));
        assert_eq!(f.registry.get_player(&author).unwrap().total_confessions, 1);
    }

    #[test]
    fn test_reveal_requires_registration() {
        let mut f = fixture();
        let s = secret();
        let id = submit(&mut f.registry, &s, "anon").unwrap();

        assert_eq!(
            reveal_as(&mut f.registry, &Address::new("GNOBODY"), &s, id),
            Err(ProtocolError::PlayerNotRegistered)
        );
        assert_eq!(
            f.registry.reveal(&Address::new("GNOBODY"), 99, &[0u8; 64]),
            Err(ProtocolError::ConfessionNotFound(99))
        );
    }

    #[test]
    fn test_reveal_by_other_player_fails() {
        let mut f = fixture();
        let (author, mallory) = (Address::new("GAUTHOR"), Address::new("GMALLORY"));
        let (s1, s2) = (secret(), secret());
        f.registry.register_player(&author, s1.commitment()).unwrap();
        f.registry.register_player(&mallory, s2.commitment()).unwrap();
        let id = submit(&mut f.registry, &s1, "author's").unwrap();

        // mallory replays the author's proof
        let c = f.registry.get_confession(id).unwrap().clone();
        let stolen = prove_reveal(&s1, id, &c.content_hash, &c.commitment, &author, &mut OsRng).unwrap();
        assert_eq!(
            f.registry.reveal(&mallory, id, stolen.proof.as_bytes()),
            Err(ProtocolError::InvalidProof)
        );

        // or proves with a different secret against the author's commitment
        assert!(prove_reveal(&s2, id, &c.content_hash, &c.commitment, &mallory, &mut OsRng).is_err());
        assert!(!f.registry.get_confession(id).unwrap().revealed);
    }

    #[test]
    fn test_registration_rules() {
        let mut f = fixture();
        let alice = Address::new("GALICE");
        let (s1, s2) = (secret(), secret());

        f.registry.register_player(&alice, s1.commitment()).unwrap();
        f.registry.register_player(&alice, s1.commitment()).unwrap();
        assert_eq!(
            f.registry.register_player(&alice, s2.commitment()),
            Err(ProtocolError::Unauthorized)
        );
        assert_eq!(
            f.registry.register_player(&Address::new("GBOB"), s1.commitment()),
            Err(ProtocolError::Unauthorized)
        );
        let registered = f
            .registry
            .events_since(0)
            .iter()
            .filter(|e| e.kind() == "player_registered")
            .count();
        assert_eq!(registered, 1);
    }

    #[test]
    fn test_round_controls() {
        let mut f = fixture();
        let s = secret();
        let author = Address::new("GAUTHOR");
        f.registry.register_player(&author, s.commitment()).unwrap();
        let id = submit(&mut f.registry, &s, "before close").unwrap();
        let bob = Address::new("GBOB");
        f.registry.place_bet(&bob, id, false, 3).unwrap();

        assert_eq!(f.registry.end_round(&bob), Err(ProtocolError::Unauthorized));
        f.registry.end_round(&f.admin.clone()).unwrap();
        assert!(!f.registry.round_active());

        assert_eq!(submit(&mut f.registry, &secret(), "after close"), Err(ProtocolError::RoundNotActive));
        assert_eq!(f.registry.place_bet(&bob, id, true, 1), Err(ProtocolError::RoundNotActive));
        // votes, comments and reveals stay open
        f.registry.vote(&bob, id, VoteType::Shocking).unwrap();
        f.registry.add_comment(&bob, id, "still here").unwrap();
        let report = reveal_as(&mut f.registry, &author, &s, id).unwrap();
        assert_eq!(report.settled, vec![(bob.clone(), BetOutcome::Lost)]);
        assert!(f.registry.get_confession(id).unwrap().revealed);
        assert!(f.registry.get_bets(id).iter().all(|b| b.settled));

        f.registry.start_round(&f.admin.clone()).unwrap();
        assert!(submit(&mut f.registry, &secret(), "reopened").is_ok());
    }

    #[test]
    fn test_comments() {
        let mut f = fixture();
        let id = submit(&mut f.registry, &secret(), "comment me").unwrap();
        let bob = Address::new("GBOB");

        f.registry.add_comment(&bob, id, "  same  ").unwrap();
        assert!(matches!(f.registry.add_comment(&bob, id, "   "), Err(ProtocolError::InvalidComment(_))));
        assert!(matches!(
            f.registry.add_comment(&bob, id, &"x".repeat(281)),
            Err(ProtocolError::InvalidComment(_))
        ));
        f.registry.add_comment(&bob, id, &"é".repeat(280)).unwrap();
        assert_eq!(
            f.registry.add_comment(&bob, 77, "hi"),
            Err(ProtocolError::ConfessionNotFound(77))
        );

        let comments = f.registry.get_comments(id);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "same");
        assert!(f.registry.get_comments(77).is_empty());
    }

    #[test]
    fn test_paging_and_filters() {
        let mut f = fixture();
        let author = Address::new("GAUTHOR");
        let s = secret();
        f.registry.register_player(&author, s.commitment()).unwrap();
        let revealed = submit(&mut f.registry, &s, "mine").unwrap();
        for i in 0..59 {
            submit(&mut f.registry, &secret(), &format!("n{}", i)).unwrap();
        }
        reveal_as(&mut f.registry, &author, &s, revealed).unwrap();

        let page = f.registry.get_confessions(&ConfessionFilter::page(0, 1000));
        assert_eq!(page.len(), 50);
        assert_eq!(page[0].id, 1);
        assert!(page.windows(2).all(|w| w[0].id < w[1].id));

        let tail = f.registry.get_confessions(&ConfessionFilter::page(55, 20));
        assert_eq!(tail.iter().map(|c| c.id).collect::<Vec<_>>(), vec![56, 57, 58, 59, 60]);

        let by_author = f.registry.get_confessions(&ConfessionFilter {
            author: Some(author.clone()),
            ..Default::default()
        });
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].id, revealed);

        let anonymous = f.registry.get_confessions(&ConfessionFilter {
            status: Some(ConfessionStatus::Submitted),
            limit: 50,
            ..Default::default()
        });
        assert_eq!(anonymous.len(), 50);
        assert!(anonymous.iter().all(|c| !c.revealed));
    }

    #[test]
    fn test_event_log_order() {
        let mut f = fixture();
        let author = Address::new("GAUTHOR");
        let s = secret();
        f.registry.register_player(&author, s.commitment()).unwrap();
        let id = submit(&mut f.registry, &s, "logged").unwrap();
        f.registry.place_bet(&Address::new("GBOB"), id, false, 3).unwrap();
        reveal_as(&mut f.registry, &author, &s, id).unwrap();

        let kinds: Vec<_> = f.registry.events_since(0).iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "player_registered",
                "confession_submitted",
                "bet_placed",
                "confession_revealed",
                "bet_settled",
            ]
        );
        assert_eq!(f.registry.events_since(3).len(), 2);
        assert!(f.registry.events_since(100).is_empty());
        assert!(f.registry.events_since(0).iter().enumerate().all(|(i, e)| e.seq == i as u64));
    }

    struct AcceptAll;

    impl ProofVerifier for AcceptAll {
        fn verify_submission(&self, _: &SubmissionPublic, _: &[u8]) -> Result<(), ProofVerificationError> {
            Ok(())
        }

        fn verify_reveal(&self, _: &RevealPublic, _: &[u8]) -> Result<(), ProofVerificationError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "accept-all"
        }
    }

    #[test]
    fn test_pluggable_verifier() {
        let f = fixture();
        let mut registry = f.registry.with_verifier(Box::new(AcceptAll));
        let out = proof_for(&registry, &secret(), "anything goes");

        assert_eq!(registry.submit(&out.public, &[]), Ok(1));
        // nullifier uniqueness does not depend on the verifier
        assert_eq!(registry.submit(&out.public, &[]), Err(ProtocolError::NullifierAlreadyUsed));
        assert!(format!("{:?}", registry).contains("accept-all"));
    }
}
