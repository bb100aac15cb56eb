pub mod types;
pub mod aead;
pub mod key_manager;

pub use types::*;
pub use aead::*;
pub use key_manager::*;
