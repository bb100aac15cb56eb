// ## 📂 File: `src/crypto/aead.rs`

//! src/crypto/aead.rs
//! Deterministic SIV-CTR AEAD (HMAC-SHA256 synthetic IV + AES-128-CTR).
//!
//! Design notes:
//! - Key is 48 bytes: MAC key (32) || encryption key (16).
//! - SIV input = nonce || BE32(|ad|) || BE32(|pt|) || ad || pt; the tag is the first 16
//!   bytes of the HMAC and doubles as the initial 128-bit CTR counter block.
//! - Output is ciphertext || tag. Identical inputs give identical output.
//! - Tag verification is constant-time and must fail closed (no partial plaintext).
//! - Lengths above 2^32-1 are rejected, never truncated.

use aes_gcm::aes::cipher::{BlockEncrypt, KeyInit};
use aes_gcm::aes::{Aes128, Block};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::constants::{ENC_KEY_LEN, TAG_LEN};
use crate::crypto::types::{CryptoError, SivField, SymmetricKey};

type HmacSha256 = Hmac<Sha256>;

/// SIV-CTR cipher bound to one key. Cheap to clone; keyed state is reused per call.
#[derive(Clone)]
pub struct SivCtr {
    mac: HmacSha256,
    cipher: Aes128,
}

impl SivCtr {
    /// Construct the cipher from a 48-byte key.
    pub fn new(key: &SymmetricKey) -> Result<Self, CryptoError> {
        let mac = <HmacSha256 as Mac>::new_from_slice(key.mac_key()).map_err(|_| {
            CryptoError::InvalidKeyLen {
                expected: SymmetricKey::LEN,
                actual: key.as_bytes().len(),
            }
        })?;
        let cipher = <Aes128 as KeyInit>::new_from_slice(key.enc_key()).map_err(|_| {
            CryptoError::InvalidKeyLen {
                expected: ENC_KEY_LEN,
                actual: key.enc_key().len(),
            }
        })?;
        Ok(Self { mac, cipher })
    }

    /// AEAD seal: returns ciphertext || tag.
    pub fn seal(&self, nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let tag = self.synthetic_iv(nonce, aad, plaintext)?;

        let mut out = Vec::with_capacity(plaintext.len() + TAG_LEN);
        out.extend_from_slice(plaintext);
        self.apply_keystream(&tag, &mut out);
        out.extend_from_slice(&tag);
        Ok(out)
    }

    /// AEAD open: verifies the trailing tag and returns the plaintext.
    ///
    /// On any mismatch the recovered bytes are wiped and `TagMismatch` is returned.
    pub fn open(
        &self,
        nonce: &[u8],
        aad: &[u8],
        ciphertext_and_tag: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if ciphertext_and_tag.len() < TAG_LEN {
            return Err(CryptoError::CiphertextTooShort {
                len: ciphertext_and_tag.len(),
                min: TAG_LEN,
            });
        }

        let (ciphertext, tag_bytes) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - TAG_LEN);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);

        let mut plaintext = ciphertext.to_vec();
        self.apply_keystream(&tag, &mut plaintext);

        let expected = match self.synthetic_iv(nonce, aad, &plaintext) {
            Ok(t) => t,
            Err(e) => {
                plaintext.zeroize();
                return Err(e);
            }
        };

        if bool::from(expected[..].ct_eq(&tag[..])) {
            Ok(plaintext)
        } else {
            plaintext.zeroize();
            Err(CryptoError::TagMismatch)
        }
    }

    /// HMAC-SHA256 over the SIV input, truncated to the tag length.
    fn synthetic_iv(&self, nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<[u8; TAG_LEN], CryptoError> {
        let (aad_len, pt_len) = siv_lengths(aad.len(), plaintext.len())?;

        let mut mac = self.mac.clone();
        mac.update(nonce);
        mac.update(&aad_len.to_be_bytes());
        mac.update(&pt_len.to_be_bytes());
        mac.update(aad);
        mac.update(plaintext);
        let full = mac.finalize().into_bytes();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&full[..TAG_LEN]);
        Ok(tag)
    }

    /// XOR `data` with the AES-CTR keystream starting at counter block `tag`.
    /// The whole 16-byte block is the counter (big-endian, wrapping at 2^128).
    fn apply_keystream(&self, tag: &[u8; TAG_LEN], data: &mut [u8]) {
        let mut counter = u128::from_be_bytes(*tag);
        for chunk in data.chunks_mut(TAG_LEN) {
            let mut block = Block::from(counter.to_be_bytes());
            self.cipher.encrypt_block(&mut block);
            for (b, k) in chunk.iter_mut().zip(block.iter()) {
                *b ^= k;
            }
            counter = counter.wrapping_add(1);
        }
    }
}

/// Length prefixes of the SIV input. Either length above 2^32-1 is rejected.
pub fn siv_lengths(aad_len: usize, pt_len: usize) -> Result<(u32, u32), CryptoError> {
    let aad = u32::try_from(aad_len).map_err(|_| CryptoError::InputTooLarge {
        field: SivField::AdditionalData,
        len: aad_len,
    })?;
    let pt = u32::try_from(pt_len).map_err(|_| CryptoError::InputTooLarge {
        field: SivField::Plaintext,
        len: pt_len,
    })?;
    Ok((aad, pt))
}

/// One-shot encrypt: `ciphertext || tag`.
pub fn encrypt(
    key: &SymmetricKey,
    nonce: &[u8],
    plaintext: &[u8],
    additional_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    SivCtr::new(key)?.seal(nonce, additional_data, plaintext)
}

/// One-shot decrypt of `ciphertext || tag`.
pub fn decrypt(
    key: &SymmetricKey,
    nonce: &[u8],
    ciphertext_and_tag: &[u8],
    additional_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    SivCtr::new(key)?.open(nonce, additional_data, ciphertext_and_tag)
}
