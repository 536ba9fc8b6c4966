//! Player Session
//!
//! Explicit per-session identity state. The secret is owned here and handed
//! to the circuits by reference; there is no process-wide secret.

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info};

use crate::core::encoding::IdentityCommitment;
use crate::identity::secret::{generate_secret, IdentityError, PlayerSecret};
use crate::ledger::types::ConfessionId;

/// Identity state for one client session.
#[derive(Debug, Default)]
pub struct PlayerSession {
    /// Secret, created lazily on first use.
    secret: Option<PlayerSecret>,
    /// Identity commitment accepted by the ledger.
    registered: bool,
    /// Confessions submitted from this session.
    my_confessions: Vec<ConfessionId>,
}

impl PlayerSession {
    /// Empty session with no secret.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session around an existing secret.
    pub fn with_secret(secret: PlayerSecret) -> Self {
        Self {
            secret: Some(secret),
            ..Self::default()
        }
    }

    /// Return the secret, generating one if the session has none.
    pub fn ensure_secret<R>(&mut self, rng: &mut R) -> Result<&PlayerSecret, IdentityError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if self.secret.is_none() {
            let secret = generate_secret(rng)?;
            info!(commitment = %secret.commitment().short(), "generated session secret");
            self.secret = Some(secret);
        }
        self.secret.as_ref().ok_or(IdentityError::SecretNotInitialized)
    }

    /// The session secret, if initialized.
    pub fn secret(&self) -> Result<&PlayerSecret, IdentityError> {
        self.secret.as_ref().ok_or(IdentityError::SecretNotInitialized)
    }

    /// Identity commitment of the session secret.
    pub fn identity_commitment(&self) -> Result<IdentityCommitment, IdentityError> {
        self.secret().map(PlayerSecret::commitment)
    }

    /// Has the session secret been registered with the ledger?
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Record that the ledger accepted this session's identity.
    pub fn mark_registered(&mut self) {
        self.registered = true;
    }

    /// Remember a confession submitted from this session.
    pub fn record_confession(&mut self, id: ConfessionId) {
        if !self.my_confessions.contains(&id) {
            self.my_confessions.push(id);
        }
    }

    /// Confessions submitted from this session, oldest first.
    pub fn my_confessions(&self) -> &[ConfessionId] {
        &self.my_confessions
    }

    /// End the identity: the secret is dropped (and wiped).
    ///
    /// The confession list is kept for display, but without the secret none
    /// of those confessions can be revealed any more.
    pub fn reset(&mut self) {
        if self.secret.take().is_some() {
            debug!("session secret destroyed");
        }
        self.registered = false;
    }
}
