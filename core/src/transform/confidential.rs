// ## 📂 File: `src/transform/confidential.rs`

//! transform/confidential.rs
//! Applies key-manager encryption / decryption to payloads of confidential contracts.
//!
//! Design notes:
//! - Every decision goes through the confidentiality oracle; a failing oracle is an error,
//!   never an implicit "not confidential".
//! - Transforms are all-or-nothing: callers receive either fully transformed data or an error.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::headers::write_deploy_header;
use crate::transform::types::{
    CompletedTransaction, ConfidentialityOracle, KeyManager, Log, TransactionRequest, TransformError,
};
use crate::types::Address;
use crate::utils::{decode_hex, encode_hex};

#[derive(Clone)]
pub struct ConfidentialTransform {
    oracle: Arc<dyn ConfidentialityOracle>,
    key_manager: Arc<dyn KeyManager>,
}

impl ConfidentialTransform {
    pub fn new(oracle: Arc<dyn ConfidentialityOracle>, key_manager: Arc<dyn KeyManager>) -> Self {
        Self { oracle, key_manager }
    }

    /// Use one collaborator for both roles (e.g. `LocalKeyManager`).
    pub fn from_shared<K>(key_manager: Arc<K>) -> Self
    where
        K: ConfidentialityOracle + KeyManager + 'static,
    {
        Self {
            oracle: key_manager.clone(),
            key_manager,
        }
    }

    pub async fn is_confidential(&self, address: &Address) -> Result<bool, TransformError> {
        self.oracle.is_confidential(address).await.map_err(|e| {
            warn!(%address, error = %e, "confidentiality check failed");
            TransformError::Oracle { address: *address, reason: format!("{:#}", e) }
        })
    }

    /// Settle path for a completed invocation: raw return data for plain contracts,
    /// decrypted return data for confidential ones.
    pub async fn resolve_return(
        &self,
        destination: &Address,
        event: CompletedTransaction,
    ) -> Result<Vec<u8>, TransformError> {
        if !self.is_confidential(destination).await? {
            return Ok(event.return_data);
        }
        debug!(%destination, hash = %event.transaction_hash, "decrypting return data");
        self.decrypt_return_data(&event.return_data).await
    }

    /// Decrypt return data already known to come from a confidential contract.
    pub async fn decrypt_return_data(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.decrypt_field(data, "returnData").await
    }

    /// Encrypt `data` for `to` when it is confidential; pass it through otherwise.
    pub async fn encrypt_call_data(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        if !self.is_confidential(to).await? {
            return Ok(data.to_vec());
        }
        self.key_manager
            .encrypt(data, to)
            .await
            .map_err(|e| TransformError::Encryption { address: *to, reason: format!("{:#}", e) })
    }

    /// Prepare an outgoing transaction before signing.
    ///
    /// - Calls to confidential contracts get their `data` encrypted.
    /// - Deployments get the requested deploy header stamped onto the bytecode.
    pub async fn prepare_transaction(
        &self,
        mut tx: TransactionRequest,
    ) -> Result<TransactionRequest, TransformError> {
        match tx.to {
            Some(to) => {
                let data = decode_hex(&tx.data)?;
                let encrypted = self.encrypt_call_data(&to, &data).await?;
                tx.data = encode_hex(&encrypted);
            }
            None => {
                if let Some(header) = tx.header.take() {
                    tx.data = write_deploy_header(&header, &tx.data)?;
                }
            }
        }
        Ok(tx)
    }

    /// Decrypt the data of one log if its emitting contract is confidential.
    pub async fn decrypt_log(&self, mut log: Log) -> Result<Log, TransformError> {
        if self.is_confidential(&log.address).await? {
            log.data = self.decrypt_field(&log.data, "log data").await?;
        }
        Ok(log)
    }

    /// Decrypt a batch of logs. Either every log is transformed or the call fails.
    pub async fn decrypt_logs(&self, logs: Vec<Log>) -> Result<Vec<Log>, TransformError> {
        let mut confidential: HashMap<Address, bool> = HashMap::new();
        let mut out = Vec::with_capacity(logs.len());

        for mut log in logs {
            let is_confidential = match confidential.get(&log.address) {
                Some(flag) => *flag,
                None => {
                    let flag = self.is_confidential(&log.address).await?;
                    confidential.insert(log.address, flag);
                    flag
                }
            };
            if is_confidential {
                log.data = self.decrypt_field(&log.data, "log data").await?;
            }
            out.push(log);
        }
        Ok(out)
    }

    async fn decrypt_field(&self, data: &[u8], field: &'static str) -> Result<Vec<u8>, TransformError> {
        self.key_manager.decrypt(data).await.map_err(|e| {
            warn!(field, error = %e, "decryption failed");
            TransformError::Decryption { field, reason: format!("{:#}", e) }
        })
    }
}
