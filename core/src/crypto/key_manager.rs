// ## 📂 File: `src/crypto/key_manager.rs`

//! crypto/key_manager.rs
//! In-process key manager backed by a single SIV-CTR key.
//!
//! Envelope layout: nonce (16 random bytes) || ciphertext || tag, empty associated data.
//! Key distribution (asymmetric exchange with the contract) is not handled here; callers
//! that have a negotiated key plug it in, tests use a generated one.

use std::collections::HashSet;

use async_trait::async_trait;
use rand::RngCore;

use crate::constants::{ENVELOPE_NONCE_LEN, TAG_LEN};
use crate::crypto::aead::SivCtr;
use crate::crypto::types::{CryptoError, SymmetricKey};
use crate::transform::{ConfidentialityOracle, KeyManager};
use crate::types::Address;

pub struct LocalKeyManager {
    cipher: SivCtr,
    confidential: HashSet<Address>,
}

impl LocalKeyManager {
    pub fn new(key: &SymmetricKey) -> Result<Self, CryptoError> {
        Ok(Self {
            cipher: SivCtr::new(key)?,
            confidential: HashSet::new(),
        })
    }

    /// Mark `address` as a confidential contract.
    pub fn with_confidential(mut self, address: Address) -> Self {
        self.confidential.insert(address);
        self
    }

    pub fn add_confidential(&mut self, address: Address) {
        self.confidential.insert(address);
    }

    pub fn seal_envelope(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; ENVELOPE_NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = self.cipher.seal(&nonce, &[], plaintext)?;
        let mut out = Vec::with_capacity(ENVELOPE_NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    pub fn open_envelope(&self, envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if envelope.len() < ENVELOPE_NONCE_LEN + TAG_LEN {
            return Err(CryptoError::CiphertextTooShort {
                len: envelope.len(),
                min: ENVELOPE_NONCE_LEN + TAG_LEN,
            });
        }
        let (nonce, sealed) = envelope.split_at(ENVELOPE_NONCE_LEN);
        self.cipher.open(nonce, &[], sealed)
    }
}

#[async_trait]
impl KeyManager for LocalKeyManager {
    async fn encrypt(&self, plaintext: &[u8], _contract: &Address) -> anyhow::Result<Vec<u8>> {
        Ok(self.seal_envelope(plaintext)?)
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(self.open_envelope(ciphertext)?)
    }
}

#[async_trait]
impl ConfidentialityOracle for LocalKeyManager {
    async fn is_confidential(&self, address: &Address) -> anyhow::Result<bool> {
        Ok(self.confidential.contains(address))
    }
}
