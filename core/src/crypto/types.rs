// ## 📂 File: `src/crypto/types.rs`

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{ENC_KEY_LEN, MAC_KEY_LEN, SYMMETRIC_KEY_LEN};

/// SIV-CTR key material: 32-byte HMAC-SHA256 key followed by a 16-byte AES-128 key.
///
/// Immutable once constructed and wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_LEN]);

impl SymmetricKey {
    pub const LEN: usize = SYMMETRIC_KEY_LEN;

    pub fn new(bytes: [u8; SYMMETRIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice; the slice must be exactly 48 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; SYMMETRIC_KEY_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLen {
                expected: SYMMETRIC_KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Fresh random key from the thread RNG.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; SYMMETRIC_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    #[inline]
    pub fn mac_key(&self) -> &[u8] {
        &self.0[..MAC_KEY_LEN]
    }

    #[inline]
    pub fn enc_key(&self) -> &[u8] {
        &self.0[MAC_KEY_LEN..MAC_KEY_LEN + ENC_KEY_LEN]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Which SIV input exceeded the 4-byte length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SivField {
    AdditionalData,
    Plaintext,
}

impl fmt::Display for SivField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SivField::AdditionalData => f.write_str("additional data"),
            SivField::Plaintext => f.write_str("plaintext"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material of the wrong size.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// AD or plaintext longer than the BE32 length prefix can encode.
    #[error("{field} too large: {len} bytes exceeds 2^32-1")]
    InputTooLarge { field: SivField, len: usize },

    /// Input cannot even hold an authentication tag.
    #[error("ciphertext too short: {len} < {min}")]
    CiphertextTooShort { len: usize, min: usize },

    /// Authentication failure. No plaintext is released.
    #[error("AEAD tag mismatch")]
    TagMismatch,
}

impl CryptoError {
    /// True for the authentication-failure kind.
    pub fn is_authentication(&self) -> bool {
        matches!(self, CryptoError::TagMismatch)
    }
}
