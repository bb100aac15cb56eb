//! confidential-core
//!
//! Client-side building blocks for confidential contracts:
//! SIV-CTR payload encryption, the deploy header codec, the confidential
//! transform and the invoke correlation engine.
//! Runtime-agnostic: everything async is plain `futures`.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod types;
pub mod utils;

// Primitives
pub mod crypto;
pub mod headers;
pub mod telemetry;

// Client layers
pub mod transform;
pub mod invoke;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::InvokeConfig;
    pub use crate::crypto::{decrypt, encrypt, CryptoError, LocalKeyManager, SivCtr, SymmetricKey};
    pub use crate::headers::{read_deploy_header, write_deploy_header, DeployHeader, HeaderError};
    pub use crate::invoke::{
        EventSource, EventStream, InvokeError, InvokeHandle, InvokeSubscriptions, PendingResult,
        StreamMessage, SubscriptionFilter,
    };
    pub use crate::telemetry::InvokeCounters;
    pub use crate::transform::{
        CompletedTransaction, ConfidentialTransform, ConfidentialityOracle, KeyManager, Log,
        TransactionRequest, TransformError,
    };
    pub use crate::types::{Address, Error, TxHash};
}
