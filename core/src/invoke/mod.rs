//! invoke/mod.rs
//! Correlation of submitted transactions with their completion events.
//!
//! Layout:
//! - `types`: transport seam, errors and single-use result handles.
//! - `registry`: per-sender subscription arena (synchronous, no I/O).
//! - `engine`: the reactor task and its cloneable handle.

pub mod types;
pub mod registry;
pub mod engine;

pub use types::*;
pub use registry::*;
pub use engine::*;
