// ## 📂 File: `src/config.rs`

//! config.rs
//! Runtime configuration of the invoke reactor.
//!
//! - Deserializable from JSON; missing fields fall back to defaults.
//! - Protocol constants are not configurable and live in `constants.rs`.

use serde::{Deserialize, Serialize};

use crate::constants::{COMPLETED_TRANSACTION_EVENT, DEFAULT_COMMAND_BUFFER};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvokeConfig {
    /// Event type passed to `EventSource::subscribe`.
    pub event_type: String,
    /// Capacity of the command channel between handles and the reactor.
    pub command_buffer: usize,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            event_type: COMPLETED_TRANSACTION_EVENT.to_string(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl InvokeConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn with_command_buffer(mut self, command_buffer: usize) -> Self {
        self.command_buffer = command_buffer;
        self
    }
}
