//! Player Secret and Identity Commitment
//!
//! The secret is a uniformly random non-zero ristretto scalar. It lives only
//! in process memory and is wiped on drop. Its public face is the identity
//! commitment `I = s·B`.

use std::fmt;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::encoding::IdentityCommitment;
use crate::core::entropy::{random_64, EntropyError};

/// Identity-layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Secure randomness could not be drawn.
    #[error(transparent)]
    EntropyUnavailable(#[from] EntropyError),

    /// The session has no secret yet.
    #[error("player secret not initialized")]
    SecretNotInitialized,
}

/// Session-bound player secret.
///
/// Never serialized and never logged; `Debug` prints a placeholder.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PlayerSecret {
    scalar: Scalar,
}

impl PlayerSecret {
    /// The secret as a scalar (for the proof circuits).
    pub(crate) fn scalar(&self) -> &Scalar {
        &self.scalar
    }

    /// Public identity commitment for this secret.
    pub fn commitment(&self) -> IdentityCommitment {
        commitment_of(self)
    }
}

impl fmt::Debug for PlayerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayerSecret(<redacted>)")
    }
}

impl PartialEq for PlayerSecret {
    fn eq(&self, other: &Self) -> bool {
        // Scalar equality is constant-time
        self.scalar == other.scalar
    }
}

impl Eq for PlayerSecret {}

/// Draw a fresh secret from a secure randomness source.
///
/// Fails with [`IdentityError::EntropyUnavailable`] if the source errors.
pub fn generate_secret<R>(rng: &mut R) -> Result<PlayerSecret, IdentityError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    loop {
        let mut wide = random_64(rng)?;
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();

        // zero would make every commitment the identity point
        if scalar != Scalar::ZERO {
            return Ok(PlayerSecret { scalar });
        }
    }
}

/// Identity commitment `s·B`. Deterministic in the secret.
pub fn commitment_of(secret: &PlayerSecret) -> IdentityCommitment {
    let point = RistrettoPoint::mul_base(secret.scalar());
    IdentityCommitment(point.compress().to_bytes())
}
