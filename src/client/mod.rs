//! Client side of the protocol.
//!
//! Ledger access (with retries), the off-ledger content cache and the
//! player-facing [`ConfessionClient`].

pub mod app;
pub mod content;
pub mod ledger;
pub mod retry;

pub use app::{ClientError, ConfessionClient, FeedItem};
pub use content::{ContentStore, InMemoryContentStore};
pub use ledger::{InMemoryLedger, LedgerClient, LedgerClientError, LedgerResult};
pub use retry::{retry_call, retry_write, RetryingLedger};
