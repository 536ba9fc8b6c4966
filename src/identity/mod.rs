//! Identity Manager
//!
//! Session secrets and their public identity commitments.

pub mod secret;
pub mod session;

pub use secret::{commitment_of, generate_secret, IdentityError, PlayerSecret};
pub use session::PlayerSession;
