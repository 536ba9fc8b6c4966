//! Core protocol primitives.
//!
//! Hashing, fixed-width value encodings, secure randomness and time. Every
//! other module builds on these.

pub mod clock;
pub mod encoding;
pub mod entropy;
pub mod hash;

// Re-export core types
pub use clock::{Clock, ManualClock, SystemClock, period_of, DEFAULT_PERIOD_SECS};
pub use encoding::{Commitment, ContentHash, DecodeError, IdentityCommitment, Nullifier};
pub use entropy::EntropyError;
pub use hash::{hash_content, Transcript};
