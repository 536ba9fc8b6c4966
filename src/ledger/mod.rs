//! Confession Ledger
//!
//! Nullifier ledger, confession registry and settlement.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CONFESSION LEDGER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  types.rs        - Confession, Bet, Comment, PlayerProfile  │
//! │  error.rs        - ProtocolError (stable codes)             │
//! │  events.rs       - Append-only event log                    │
//! │  registry.rs     - Nullifier set + registry state machine   │
//! │  settlement.rs   - Bet settlement on reveal                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod events;
pub mod registry;
pub mod settlement;
pub mod types;

pub use error::ProtocolError;
pub use events::{LedgerEvent, LedgerEventData};
pub use registry::{ConfessionRegistry, FIRST_CONFESSION_ID};
pub use settlement::{settle_bets, SettlementReport};
pub use types::{
    Address, Bet, BetOutcome, Comment, Confession, ConfessionFilter, ConfessionId,
    ConfessionStatus, NullifierRecord, PlayerProfile, VoteType,
};
