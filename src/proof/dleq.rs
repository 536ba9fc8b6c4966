//! Chaum-Pedersen Proof of Discrete-Log Equality
//!
//! Proves knowledge of `x` such that `X = x·A` and `Y = x·B` for public
//! `(A, X, B, Y)` without revealing `x`. Made non-interactive with the
//! Fiat-Shamir [`Transcript`]; the caller seeds the transcript with
//! whatever context the proof must be bound to.
//!
//! ```text
//! prover:   k <- nonce,  R1 = k·A,  R2 = k·B
//!           c = H(ctx, A, X, B, Y, R1, R2)
//!           z = k - c·x
//! verifier: R1' = z·A + c·X,  R2' = z·B + c·Y
//!           accept iff H(ctx, A, X, B, Y, R1', R2') == c
//! ```

use std::fmt;

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::encoding::DecodeError;
use crate::core::entropy::{random_32, EntropyError};
use crate::core::hash::Transcript;
use crate::proof::error::ProofVerificationError;

/// Encoded proof size: challenge ‖ response.
pub const PROOF_SIZE: usize = 64;

/// Public statement `log_A(X) == log_B(Y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DleqStatement {
    /// First base.
    pub base_a: RistrettoPoint,
    /// `x·A`.
    pub public_a: RistrettoPoint,
    /// Second base.
    pub base_b: RistrettoPoint,
    /// `x·B`.
    pub public_b: RistrettoPoint,
}

impl DleqStatement {
    fn bind(&self, transcript: &mut Transcript) {
        transcript.append_point(b"base_a", &self.base_a);
        transcript.append_point(b"public_a", &self.public_a);
        transcript.append_point(b"base_b", &self.base_b);
        transcript.append_point(b"public_b", &self.public_b);
    }

    /// Does `x` satisfy the statement?
    pub fn is_witness(&self, x: &Scalar) -> bool {
        x * self.base_a == self.public_a && x * self.base_b == self.public_b
    }
}

/// Non-interactive DLEQ proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DleqProof {
    challenge: Scalar,
    response: Scalar,
}

impl DleqProof {
    /// Prove the statement with witness `x`.
    ///
    /// The witness is not checked here; a wrong witness yields a proof that
    /// fails [`DleqProof::verify`]. Callers check the relation first.
    pub fn prove<R>(
        mut transcript: Transcript,
        statement: &DleqStatement,
        x: &Scalar,
        rng: &mut R,
    ) -> Result<Self, EntropyError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        statement.bind(&mut transcript);

        let fresh = random_32(rng)?;
        let k = transcript.witness_nonce(x, &fresh);

        transcript.append_point(b"r1", &(k * statement.base_a));
        transcript.append_point(b"r2", &(k * statement.base_b));
        let challenge = transcript.challenge_scalar(b"c");

        let response = k - challenge * x;

        Ok(Self { challenge, response })
    }

    /// Check the proof against the statement under the same transcript
    /// context the prover used.
    pub fn verify(
        &self,
        mut transcript: Transcript,
        statement: &DleqStatement,
    ) -> Result<(), ProofVerificationError> {
        if statement.public_a.is_identity() || statement.public_b.is_identity() {
            return Err(ProofVerificationError::InvalidPublicInput("identity point"));
        }

        let r1 = self.response * statement.base_a + self.challenge * statement.public_a;
        let r2 = self.response * statement.base_b + self.challenge * statement.public_b;

        statement.bind(&mut transcript);
        transcript.append_point(b"r1", &r1);
        transcript.append_point(b"r2", &r2);

        if transcript.challenge_scalar(b"c") == self.challenge {
            Ok(())
        } else {
            Err(ProofVerificationError::VerificationFailed)
        }
    }

    /// Encode as 64 bytes.
    pub fn to_bytes(&self) -> [u8; PROOF_SIZE] {
        let mut out = [0u8; PROOF_SIZE];
        out[..32].copy_from_slice(self.challenge.as_bytes());
        out[32..].copy_from_slice(self.response.as_bytes());
        out
    }

    /// Decode, rejecting wrong lengths and non-canonical scalars.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofVerificationError> {
        if bytes.len() != PROOF_SIZE {
            return Err(ProofVerificationError::InvalidProofFormat);
        }

        let mut c = [0u8; 32];
        let mut z = [0u8; 32];
        c.copy_from_slice(&bytes[..32]);
        z.copy_from_slice(&bytes[32..]);

        let challenge: Option<Scalar> = Scalar::from_canonical_bytes(c).into();
        let response: Option<Scalar> = Scalar::from_canonical_bytes(z).into();

        match (challenge, response) {
            (Some(challenge), Some(response)) => Ok(Self { challenge, response }),
            _ => Err(ProofVerificationError::InvalidProofFormat),
        }
    }
}

/// Proof bytes as they travel to the ledger.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncodedProof([u8; PROOF_SIZE]);

impl EncodedProof {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; PROOF_SIZE] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex. Only the length is checked here; scalar validity is
    /// the verifier's concern.
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
        let arr: [u8; PROOF_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| DecodeError::WrongLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl From<DleqProof> for EncodedProof {
    fn from(proof: DleqProof) -> Self {
        Self(proof.to_bytes())
    }
}

impl From<[u8; PROOF_SIZE]> for EncodedProof {
    fn from(bytes: [u8; PROOF_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for EncodedProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedProof({}..)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for EncodedProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EncodedProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Decompress a 32-byte encoding into a group element.
pub fn decompress(bytes: &[u8; 32], what: &'static str) -> Result<RistrettoPoint, ProofVerificationError> {
    CompressedRistretto(*bytes)
        .decompress()
        .ok_or(ProofVerificationError::InvalidPublicInput(what))
}
