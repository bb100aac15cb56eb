//! headers/mod.rs
//! Deploy header codec: metadata (expiry, confidentiality) framed in front of bytecode.
//!
//! Notes:
//! - Fixed framing: MAGIC (4B) || VERSION (2B) || LENGTH (2B, big-endian) || JSON || code.
//! - Writing is a merge: a second write updates fields in place instead of stacking frames.
//! - Re-reading and re-writing with the same header is byte-identical.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
