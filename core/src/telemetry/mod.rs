// ## 📂 File: `src/telemetry/mod.rs`

//! telemetry/mod.rs
//! Counters describing the correlation engine's lifecycle.
//!
//! Notes:
//! - Counters are owned by the reactor and mutated on its task only, so plain integers suffice.
//! - Callers receive a copied snapshot via `InvokeHandle::counters()`.

pub mod counters;

pub use counters::*;
