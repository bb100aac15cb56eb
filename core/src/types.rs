use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::constants::{ADDRESS_LEN, HASH_LEN};
use crate::crypto::CryptoError;
use crate::headers::HeaderError;
use crate::invoke::InvokeError;
use crate::transform::TransformError;
use crate::utils::decode_hex_array;

/// Unified error covering crypto, header, transform and invoke failures.
/// - `From<T>` impls enable `?` across module boundaries.
#[derive(Debug, Error)]
pub enum Error {
    /// AEAD failure (authentication, sizes).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Deploy header validation failure.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// Confidentiality check or payload transform failure.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Correlation engine failure.
    #[error("invoke error: {0}")]
    Invoke(#[from] InvokeError),

    /// Malformed address / hash text.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid {kind}: {reason}")]
    InvalidHex { kind: &'static str, reason: String },
}

macro_rules! fixed_hex_type {
    ($(#[$meta:meta])* $name:ident, $len:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_hex_array::<$len>(s)
                    .map(Self)
                    .map_err(|e| ParseError::InvalidHex { kind: $kind, reason: e.to_string() })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_hex_type!(
    /// 20-byte account / contract address.
    Address,
    ADDRESS_LEN,
    "address"
);

fixed_hex_type!(
    /// 32-byte transaction hash (also used for log topics).
    TxHash,
    HASH_LEN,
    "transaction hash"
);
