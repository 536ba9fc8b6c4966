//! Protocol Errors
//!
//! Every rejection the ledger can return. All of these are terminal: they
//! describe a violated precondition, so retrying the same call cannot help.
//! Codes 1-9 are the deployed contract's error codes and must not change.

use serde::{Deserialize, Serialize};

use crate::ledger::types::ConfessionId;

/// Ledger rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ProtocolError {
    /// The nullifier was already spent.
    #[error("nullifier already used")]
    NullifierAlreadyUsed,

    /// A submission or reveal proof did not verify.
    #[error("invalid proof")]
    InvalidProof,

    /// The caller has no registered identity.
    #[error("player not registered")]
    PlayerNotRegistered,

    /// No confession with that id.
    #[error("confession {0} not found")]
    ConfessionNotFound(ConfessionId),

    /// Betting on this confession has closed (it was revealed).
    #[error("betting closed for confession {0}")]
    BetAlreadyClosed(ConfessionId),

    /// The caller already voted on this confession.
    #[error("already voted on confession {0}")]
    AlreadyVoted(ConfessionId),

    /// The caller may not perform this action.
    #[error("unauthorized")]
    Unauthorized,

    /// Stake is not a positive amount.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The round is closed for submissions and bets.
    #[error("round not active")]
    RoundNotActive,

    /// The submission's period salt is not the ledger's current period.
    #[error("period mismatch: expected {expected}, got {got}")]
    PeriodMismatch {
        /// Ledger's current period.
        expected: u64,
        /// Period the proof was made for.
        got: u64,
    },

    /// The caller already holds a bet on this confession.
    #[error("already bet on confession {0}")]
    AlreadyBet(ConfessionId),

    /// Comment text is empty or too long.
    #[error("invalid comment: {0}")]
    InvalidComment(String),
}

impl ProtocolError {
    /// Stable numeric code.
    pub fn code(&self) -> u32 {
        match self {
            Self::NullifierAlreadyUsed => 1,
            Self::InvalidProof => 2,
            Self::PlayerNotRegistered => 3,
            Self::ConfessionNotFound(_) => 4,
            Self::BetAlreadyClosed(_) => 5,
            Self::AlreadyVoted(_) => 6,
            Self::Unauthorized => 7,
            Self::InsufficientFunds => 8,
            Self::RoundNotActive => 9,
            Self::PeriodMismatch { .. } => 10,
            Self::AlreadyBet(_) => 11,
            Self::InvalidComment(_) => 12,
        }
    }
}
