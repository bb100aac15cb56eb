//! transform/mod.rs
//! Confidential transform: routes outgoing and incoming payloads through the key manager
//! when, and only when, the confidentiality oracle says the contract is confidential.

pub mod types;
pub mod confidential;
pub mod stream;

pub use types::*;
pub use confidential::*;
pub use stream::*;
