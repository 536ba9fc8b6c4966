//! Ledger Events
//!
//! One event per successful mutation, in commit order, for indexers and
//! replay.

use serde::{Deserialize, Serialize};

use crate::core::encoding::{ContentHash, IdentityCommitment, Nullifier};
use crate::ledger::types::{Address, BetOutcome, ConfessionId, VoteType};

/// Event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventData {
    /// Identity commitment registered
    PlayerRegistered {
        /// Registering address.
        player: Address,
        /// Published `s·B`.
        identity_commitment: IdentityCommitment,
    },

    /// New anonymous confession
    ConfessionSubmitted {
        /// Assigned id.
        confession_id: ConfessionId,
        /// Hash of the confession text.
        content_hash: ContentHash,
        /// Nullifier spent by the submission.
        nullifier: Nullifier,
        /// Period the nullifier belongs to.
        period: u64,
    },

    /// Vote counted
    VoteCast {
        /// Confession voted on.
        confession_id: ConfessionId,
        /// Voting address.
        voter: Address,
        /// Counter incremented.
        vote: VoteType,
    },

    /// Bet accepted
    BetPlaced {
        /// Confession bet on.
        confession_id: ConfessionId,
        /// Betting address.
        bettor: Address,
        /// `true` = "this really happened".
        bet_real: bool,
        /// Stake in the ledger's smallest unit.
        amount: i128,
    },

    /// Authorship proven
    ConfessionRevealed {
        /// Revealed confession.
        confession_id: ConfessionId,
        /// Proven author.
        author: Address,
    },

    /// Bet resolved by a reveal
    BetSettled {
        /// Confession the bet referenced.
        confession_id: ConfessionId,
        /// Bet owner.
        bettor: Address,
        /// Won or lost.
        outcome: BetOutcome,
    },

    /// Comment appended
    CommentAdded {
        /// Confession commented on.
        confession_id: ConfessionId,
        /// Commenter.
        author: Address,
    },

    /// Round opened or closed
    RoundChanged {
        /// Round state after the change.
        active: bool,
    },
}

/// A ledger event with its commit time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the event log (0-based).
    pub seq: u64,

    /// Unix seconds.
    pub timestamp: i64,

    /// Confession involved, if any.
    pub confession_id: Option<ConfessionId>,

    /// Event data
    pub data: LedgerEventData,
}

impl LedgerEvent {
    /// Create a new event.
    pub fn new(seq: u64, timestamp: i64, data: LedgerEventData) -> Self {
        let confession_id = match &data {
            LedgerEventData::ConfessionSubmitted { confession_id, .. }
            | LedgerEventData::VoteCast { confession_id, .. }
            | LedgerEventData::BetPlaced { confession_id, .. }
            | LedgerEventData::ConfessionRevealed { confession_id, .. }
            | LedgerEventData::BetSettled { confession_id, .. }
            | LedgerEventData::CommentAdded { confession_id, .. } => Some(*confession_id),
            LedgerEventData::PlayerRegistered { .. } | LedgerEventData::RoundChanged { .. } => None,
        };

        Self {
            seq,
            timestamp,
            confession_id,
            data,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self.data {
            LedgerEventData::PlayerRegistered { .. } => "player_registered",
            LedgerEventData::ConfessionSubmitted { .. } => "confession_submitted",
            LedgerEventData::VoteCast { .. } => "vote_cast",
            LedgerEventData::BetPlaced { .. } => "bet_placed",
            LedgerEventData::ConfessionRevealed { .. } => "confession_revealed",
            LedgerEventData::BetSettled { .. } => "bet_settled",
            LedgerEventData::CommentAdded { .. } => "comment_added",
            LedgerEventData::RoundChanged { .. } => "round_changed",
        }
    }
}
