//! # Confession Box
//!
//! Anonymous confession protocol: submit now without revealing who you are,
//! prove authorship later without revealing your secret.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CONFESSION BOX                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Protocol primitives                       │
//! │  ├── hash.rs     - SHA-256 content hash, hash-to-point,      │
//! │  │                 Fiat-Shamir transcript                    │
//! │  ├── encoding.rs - 32-byte value newtypes (hex)              │
//! │  ├── entropy.rs  - Fallible secure randomness                │
//! │  └── clock.rs    - Time source, nullifier periods            │
//! │                                                              │
//! │  identity/       - Session secret + identity commitment      │
//! │                                                              │
//! │  proof/          - Zero-knowledge circuits (DLEQ)            │
//! │  ├── submission.rs - nullifier + commitment                  │
//! │  ├── reveal.rs   - authorship proof                          │
//! │  ├── verify.rs   - ProofVerifier seam                        │
//! │  └── task.rs     - Cancellable background proving            │
//! │                                                              │
//! │  ledger/         - Authoritative state (deterministic)       │
//! │  ├── registry.rs - Nullifier set + confession registry       │
//! │  └── settlement.rs - Bet settlement on reveal                │
//! │                                                              │
//! │  client/         - Async collaborators (non-deterministic)   │
//! │  ├── ledger.rs   - LedgerClient, InMemoryLedger              │
//! │  ├── retry.rs    - Backoff on transport faults               │
//! │  ├── content.rs  - Off-ledger plaintext cache                │
//! │  └── app.rs      - ConfessionClient facade                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Protocol
//!
//! With secret `s`, period base `P` and content base `Hc`:
//! - identity commitment `I = s·B` (published at registration)
//! - nullifier `N = s·P` (one per secret per period)
//! - commitment `C = s·Hc` (binds secret and content)
//!
//! Submission proves `log_P(N) == log_Hc(C)`; reveal proves
//! `log_B(I) == log_Hc(C)`. Neither proof discloses `s`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod core;
pub mod identity;
pub mod ledger;
pub mod proof;

// Re-export commonly used types
pub use client::{ConfessionClient, InMemoryContentStore, InMemoryLedger, LedgerClient};
pub use config::ProtocolConfig;
pub use crate::core::{hash_content, Commitment, ContentHash, IdentityCommitment, Nullifier};
pub use identity::{PlayerSecret, PlayerSession};
pub use ledger::{Address, ConfessionId, ConfessionRegistry, ProtocolError, VoteType};
pub use proof::{ProofVerifier, RevealPublic, SubmissionPublic};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
