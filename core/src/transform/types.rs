// ## 📂 File: `src/transform/types.rs`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::headers::{DeployHeader, HeaderError};
use crate::types::{Address, TxHash};
use crate::utils::serde_hex;

/// Answers whether the contract at an address is confidential.
///
/// Supplied by the transport / key manager layer; failures are surfaced, never defaulted.
#[async_trait]
pub trait ConfidentialityOracle: Send + Sync {
    async fn is_confidential(&self, address: &Address) -> anyhow::Result<bool>;
}

/// Symmetric payload protection negotiated with a confidential contract.
#[async_trait]
pub trait KeyManager: Send + Sync {
    /// Encrypt an outgoing call payload for `contract`.
    async fn encrypt(&self, plaintext: &[u8], contract: &Address) -> anyhow::Result<Vec<u8>>;

    /// Decrypt return data or log data produced by a confidential contract.
    async fn decrypt(&self, ciphertext: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Completion event delivered by the transport for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTransaction {
    pub transaction_hash: TxHash,
    #[serde(with = "serde_hex")]
    pub return_data: Vec<u8>,
}

/// Contract log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<TxHash>,
    #[serde(with = "serde_hex")]
    pub data: Vec<u8>,
}

/// Outgoing transaction as seen before signing.
///
/// - `to: Some(_)`: a call; `data` is the ABI-encoded call payload.
/// - `to: None`: a deployment; `data` is the contract bytecode and `header` is stamped onto it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// `0x` hex text.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<DeployHeader>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Confidentiality oracle failed.
    #[error("failed to verify if {address} is a confidential contract: {reason}")]
    Oracle { address: Address, reason: String },

    /// Key manager could not decrypt an incoming payload.
    #[error("failed to decrypt {field}: {reason}")]
    Decryption { field: &'static str, reason: String },

    /// Key manager could not encrypt an outgoing payload.
    #[error("failed to encrypt call data for {address}: {reason}")]
    Encryption { address: Address, reason: String },

    /// Deploy header could not be written.
    #[error(transparent)]
    Header(#[from] HeaderError),

    /// Transaction data was not valid hex.
    #[error("invalid transaction data hex: {0}")]
    InvalidHex(String),

    /// Error reported by the wrapped event stream itself.
    #[error("event stream error: {0}")]
    Upstream(String),
}

impl From<hex::FromHexError> for TransformError {
    fn from(e: hex::FromHexError) -> Self {
        TransformError::InvalidHex(e.to_string())
    }
}
