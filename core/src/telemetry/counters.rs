// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters updated by the invoke reactor.
//!
//! Summary: Tracks subscriptions, events, expectations and settlements.
//! Snapshotted (cloned) on request; serializable for external reporting.
use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeCounters {
    pub subscriptions_opened: u64,
    pub subscriptions_torn_down: u64,
    pub events_received: u64,
    pub events_cached: u64,
    pub expectations_registered: u64,
    pub settlements_ok: u64,
    pub settlements_failed: u64,
    /// Expectations rejected because their subscription failed or was closed.
    pub expectations_rejected: u64,
}

impl InvokeCounters {
    pub fn record_settlement(&mut self, ok: bool) {
        if ok {
            self.settlements_ok += 1;
        } else {
            self.settlements_failed += 1;
        }
    }
}
