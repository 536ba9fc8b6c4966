//! Ledger Records
//!
//! Confessions, bets, comments and player profiles as the registry stores
//! them. Records are plain data; all mutation goes through the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::encoding::{Commitment, ContentHash, IdentityCommitment, Nullifier};

/// Sequential confession identifier, assigned by the registry.
pub type ConfessionId = u64;

/// Ledger account address (wallet public key).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    /// Wrap an address string.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

/// Vote kinds. Closed set; the discriminants are the wire values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VoteType {
    /// "Me too"
    Relatable = 0,
    /// "No way"
    Shocking = 1,
    /// "Made up"
    Fake = 2,
}

impl VoteType {
    /// Parse a wire value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Relatable),
            1 => Some(Self::Shocking),
            2 => Some(Self::Fake),
            _ => None,
        }
    }
}

/// Confession lifecycle. `Revealed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfessionStatus {
    /// Anonymous.
    Submitted,
    /// Authorship proven.
    Revealed,
}

/// A confession as anchored on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confession {
    /// Sequential id.
    pub id: ConfessionId,
    /// Hash of the plaintext.
    pub content_hash: ContentHash,
    /// Submission commitment (binds content and the author's secret).
    pub commitment: Commitment,
    /// Submission nullifier (unique ledger-wide).
    pub nullifier: Nullifier,
    /// Period the nullifier was spent in.
    pub period: u64,
    /// One-way flag, set by a successful reveal.
    pub revealed: bool,
    /// Set only on reveal.
    pub author: Option<Address>,
    /// Unix seconds at submission.
    pub timestamp: i64,
    /// "Relatable" votes.
    pub votes_relatable: u32,
    /// "Shocking" votes.
    pub votes_shocking: u32,
    /// "Fake" votes.
    pub votes_fake: u32,
}

impl Confession {
    /// Current lifecycle state.
    pub fn status(&self) -> ConfessionStatus {
        if self.revealed {
            ConfessionStatus::Revealed
        } else {
            ConfessionStatus::Submitted
        }
    }

    /// Total votes of all kinds.
    pub fn total_votes(&self) -> u64 {
        self.votes_relatable as u64 + self.votes_shocking as u64 + self.votes_fake as u64
    }

    pub(crate) fn add_vote(&mut self, vote: VoteType) {
        let counter = match vote {
            VoteType::Relatable => &mut self.votes_relatable,
            VoteType::Shocking => &mut self.votes_shocking,
            VoteType::Fake => &mut self.votes_fake,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Result of a settled bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetOutcome {
    /// The bettor called it.
    Won,
    /// The bettor was wrong.
    Lost,
}

/// A bet on whether a confession is real.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    /// Who placed it.
    pub bettor: Address,
    /// Confession it references.
    pub confession_id: ConfessionId,
    /// `true` = "this really happened".
    pub bet_real: bool,
    /// Stake in the ledger's smallest unit.
    pub amount: i128,
    /// One-way flag, false until settlement.
    pub settled: bool,
    /// Set together with `settled`.
    pub outcome: Option<BetOutcome>,
}

/// A comment under a confession.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Commenter.
    pub author: Address,
    /// Comment text.
    pub text: String,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Registered player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// `s·B` for the player's session secret.
    pub identity_commitment: IdentityCommitment,
    /// Grows with each proven confession.
    pub reputation_score: i32,
    /// Confessions this player has revealed.
    pub total_confessions: u32,
}

/// Nullifier ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierRecord {
    /// Confession the nullifier was spent on.
    pub confession_id: ConfessionId,
    /// Period it was spent in.
    pub period: u64,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Confession query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfessionFilter {
    /// Matching records to skip.
    pub offset: usize,
    /// Page size (capped by the ledger).
    pub limit: usize,
    /// Only confessions in this state.
    pub status: Option<ConfessionStatus>,
    /// Only confessions revealed by this author.
    pub author: Option<Address>,
}

impl Default for ConfessionFilter {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
            status: None,
            author: None,
        }
    }
}

impl ConfessionFilter {
    /// Plain page.
    pub fn page(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    /// Does a record pass the non-paging criteria?
    pub fn matches(&self, confession: &Confession) -> bool {
        if let Some(status) = self.status {
            if confession.status() != status {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if confession.author.as_ref() != Some(author) {
                return false;
            }
        }
        true
    }
}
