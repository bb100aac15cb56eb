// ## 📂 File: `src/invoke/registry.rs`

//! invoke/registry.rs
//! Per-sender subscription arena with the expected / received correlation caches.
//!
//! Design notes:
//! - One record per active sender address; a record owns the abort handle of its stream, so
//!   removing the record stops the stream.
//! - Every record carries a generation. A record re-created after teardown gets a new one,
//!   which lets the reactor drop messages still in flight from the old stream.
//! - Exactly one path settles an expectation: either the event arrives first and is cached
//!   in `received`, or the registration arrives first and waits in `expected`.
//! - The registry never awaits; matches are handed back as `Settlement`s for the caller to run.

use std::collections::HashMap;
use std::task::Context;

use futures::stream::AbortHandle;
use tracing::{debug, warn};

use crate::invoke::types::{InvokeError, ResultResolver};
use crate::telemetry::InvokeCounters;
use crate::transform::CompletedTransaction;
use crate::types::{Address, TxHash};

/// A matched (hash, event) pair ready to be resolved through the confidential transform.
#[derive(Debug)]
pub struct Settlement {
    pub from: Address,
    pub hash: TxHash,
    pub destination: Address,
    pub event: CompletedTransaction,
    pub resolver: ResultResolver,
}

#[derive(Debug)]
struct Expectation {
    destination: Address,
    resolver: ResultResolver,
}

/// Result of feeding one completion event into the registry.
#[derive(Debug)]
pub enum EventOutcome {
    /// The hash was awaited; settle it.
    Matched(Settlement),
    /// Nobody awaits the hash yet; it is kept in `received`.
    Cached,
    /// No active subscription for the address.
    Ignored,
}

#[derive(Debug)]
struct Subscription {
    generation: u64,
    stream: AbortHandle,
    received: HashMap<TxHash, CompletedTransaction>,
    expected: HashMap<TxHash, Expectation>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stream.abort();
    }
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<Address, Subscription>,
    next_generation: u64,
    counters: InvokeCounters,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the active subscription's generation, creating the record when absent.
    ///
    /// `open` is called at most once, with the new generation, and must return the abort
    /// handle of the freshly opened stream.
    pub fn get_or_create<F>(&mut self, from: Address, open: F) -> u64
    where
        F: FnOnce(u64) -> AbortHandle,
    {
        if let Some(sub) = self.subscriptions.get(&from) {
            return sub.generation;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let stream = open(generation);
        self.subscriptions.insert(
            from,
            Subscription {
                generation,
                stream,
                received: HashMap::new(),
                expected: HashMap::new(),
            },
        );
        self.counters.subscriptions_opened += 1;
        debug!(%from, generation, "subscription opened");
        generation
    }

    /// Record that `hash` sent by `from` is awaited.
    ///
    /// Returns a settlement when the completion event was already received.
    pub fn register_expectation(
        &mut self,
        from: Address,
        hash: TxHash,
        destination: Address,
        resolver: ResultResolver,
    ) -> Result<Option<Settlement>, InvokeError> {
        let sub = self
            .subscriptions
            .get_mut(&from)
            .ok_or(InvokeError::SubscriptionNotFound { address: from })?;

        if let Some(event) = sub.received.remove(&hash) {
            self.counters.expectations_registered += 1;
            debug!(%from, %hash, "expectation matched cached event");
            return Ok(Some(Settlement { from, hash, destination, event, resolver }));
        }

        // An entry whose caller stopped waiting no longer blocks the hash.
        if let Some(existing) = sub.expected.get(&hash) {
            if !existing.resolver.is_canceled() {
                return Err(InvokeError::DuplicateExpectation { address: from, hash });
            }
            debug!(%from, %hash, "replacing abandoned expectation");
        }

        sub.expected.insert(hash, Expectation { destination, resolver });
        self.counters.expectations_registered += 1;
        debug!(%from, %hash, "expectation registered");
        Ok(None)
    }

    /// Forget an expectation nobody will collect. Returns false when none was registered.
    pub fn cancel_expectation(&mut self, from: Address, hash: TxHash) -> bool {
        let removed = self
            .subscriptions
            .get_mut(&from)
            .and_then(|sub| sub.expected.remove(&hash))
            .is_some();
        if removed {
            debug!(%from, %hash, "expectation cancelled");
        }
        removed
    }

    /// Drop every expectation whose caller stopped waiting. Live ones register `cx` so the
    /// owner is woken when their `PendingResult` goes away.
    pub fn prune_abandoned(&mut self, cx: &mut Context<'_>) -> usize {
        let mut pruned = 0;
        for (from, sub) in self.subscriptions.iter_mut() {
            sub.expected.retain(|hash, expectation| {
                let live = expectation.resolver.poll_canceled(cx).is_pending();
                if !live {
                    debug!(%from, %hash, "expectation abandoned");
                    pruned += 1;
                }
                live
            });
        }
        pruned
    }

    /// Feed one completion event observed on `from`'s stream.
    pub fn on_event_received(&mut self, from: Address, event: CompletedTransaction) -> EventOutcome {
        let Some(sub) = self.subscriptions.get_mut(&from) else {
            return EventOutcome::Ignored;
        };
        self.counters.events_received += 1;

        let hash = event.transaction_hash;
        if let Some(Expectation { destination, resolver }) = sub.expected.remove(&hash) {
            debug!(%from, %hash, "event matched expectation");
            return EventOutcome::Matched(Settlement { from, hash, destination, event, resolver });
        }

        sub.received.insert(hash, event);
        self.counters.events_cached += 1;
        debug!(%from, %hash, cached = sub.received.len(), "event cached");
        EventOutcome::Cached
    }

    /// Tear down `from` after its stream failed, rejecting everything it awaited.
    ///
    /// Returns the number of rejected expectations; unknown addresses are a no-op.
    pub fn on_stream_error(&mut self, from: Address, cause: &str) -> usize {
        let Some(sub) = self.subscriptions.get(&from) else {
            return 0;
        };
        warn!(%from, generation = sub.generation, cause, "subscription stream failed");
        self.remove_rejecting(from, |address| InvokeError::Transport {
            address,
            cause: cause.to_string(),
        })
    }

    /// Explicitly tear down `from`. Pending expectations are rejected with `SubscriptionClosed`.
    ///
    /// Returns false when no subscription was active.
    pub fn teardown(&mut self, from: Address) -> bool {
        if !self.subscriptions.contains_key(&from) {
            return false;
        }
        let rejected = self.remove_rejecting(from, |address| InvokeError::SubscriptionClosed { address });
        debug!(%from, rejected, "subscription closed");
        true
    }

    fn remove_rejecting<F>(&mut self, from: Address, err: F) -> usize
    where
        F: Fn(Address) -> InvokeError,
    {
        let Some(mut sub) = self.subscriptions.remove(&from) else {
            return 0;
        };
        let rejected = sub.expected.len();
        for (_, expectation) in sub.expected.drain() {
            expectation.resolver.reject(err(from));
        }
        // Dropping the record aborts its stream and discards `received`.
        drop(sub);

        self.counters.subscriptions_torn_down += 1;
        self.counters.expectations_rejected += rejected as u64;
        rejected
    }

    pub fn generation(&self, from: &Address) -> Option<u64> {
        self.subscriptions.get(from).map(|sub| sub.generation)
    }

    pub fn contains(&self, from: &Address) -> bool {
        self.subscriptions.contains_key(from)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Expectations awaiting an event whose caller still holds the result, across all addresses.
    pub fn pending_expectations(&self) -> usize {
        self.subscriptions
            .values()
            .flat_map(|sub| sub.expected.values())
            .filter(|expectation| !expectation.resolver.is_canceled())
            .count()
    }

    pub fn expected_len(&self, from: &Address) -> usize {
        self.subscriptions.get(from).map_or(0, |sub| sub.expected.len())
    }

    pub fn received_len(&self, from: &Address) -> usize {
        self.subscriptions.get(from).map_or(0, |sub| sub.received.len())
    }

    pub fn record_settlement(&mut self, ok: bool) {
        self.counters.record_settlement(ok);
    }

    pub fn counters(&self) -> InvokeCounters {
        self.counters
    }

    /// Drop every record, aborting all streams. Pending resolvers are dropped unsettled.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}
