//! Fixed-Width Byte Values
//!
//! Every public protocol value (content hash, nullifier, commitment,
//! identity commitment) is 32 bytes on the wire. This module gives each a
//! distinct newtype so they cannot be mixed up, with hex rendering for logs
//! and hex strings as their serde form.

use std::fmt;

/// Errors decoding a hex-encoded 32-byte value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Input decodes to the wrong number of bytes.
    #[error("wrong length: got {0} bytes")]
    WrongLength(usize),
}

/// Decode a hex string (optional `0x` prefix, odd length left-padded).
pub fn decode_hex_32(input: &str) -> Result<[u8; 32], DecodeError> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    let padded;
    let digits = if trimmed.len() % 2 == 1 {
        padded = format!("0{}", trimmed);
        padded.as_str()
    } else {
        trimmed
    };

    let bytes = hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(DecodeError::WrongLength(bytes.len()));
    }

    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! bytes32_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Full lowercase hex.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex (with or without `0x`).
            pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
                decode_hex_32(s).map(Self)
            }

            /// First four bytes as hex, for log lines.
            pub fn short(&self) -> String {
                hex::encode(&self.0[..4])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", stringify!($name), self.short())
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

bytes32_newtype!(
    /// SHA-256 of a confession's plaintext. The plaintext itself never
    /// reaches the ledger.
    ContentHash
);

bytes32_newtype!(
    /// Per-(secret, period) tag; compressed ristretto point `s·P`.
    Nullifier
);

bytes32_newtype!(
    /// Per-(secret, content) binding; compressed ristretto point `s·Hc`.
    Commitment
);

bytes32_newtype!(
    /// Public identity binding; compressed ristretto point `s·B`.
    IdentityCommitment
);
