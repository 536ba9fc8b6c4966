//! Secure Randomness
//!
//! All randomness in the protocol (player secrets, proof nonces) is drawn
//! through [`fill_secure`], which surfaces a failing source as an error
//! instead of panicking or silently falling back to weaker bytes.

use rand_core::{CryptoRng, RngCore};

/// The platform randomness source could not supply bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("secure randomness unavailable: {0}")]
pub struct EntropyError(pub String);

/// Fill `dest` from a cryptographically secure source.
pub fn fill_secure<R>(rng: &mut R, dest: &mut [u8]) -> Result<(), EntropyError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    rng.try_fill_bytes(dest)
        .map_err(|e| EntropyError(e.to_string()))
}

/// Draw 32 fresh bytes.
pub fn random_32<R>(rng: &mut R) -> Result<[u8; 32], EntropyError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut out = [0u8; 32];
    fill_secure(rng, &mut out)?;
    Ok(out)
}

/// Draw 64 fresh bytes (for wide reduction into the scalar field).
pub fn random_64<R>(rng: &mut R) -> Result<[u8; 64], EntropyError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut out = [0u8; 64];
    fill_secure(rng, &mut out)?;
    Ok(out)
}

/// Source that always fails. Used to exercise the unavailable-entropy path.
#[cfg(test)]
pub(crate) struct BrokenEntropy;

#[cfg(test)]
impl RngCore for BrokenEntropy {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "entropy pool offline",
        )))
    }
}

#[cfg(test)]
impl CryptoRng for BrokenEntropy {}
