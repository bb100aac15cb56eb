// ## 📂 File: `src/invoke/engine.rs`

//! invoke/engine.rs
//! Single-task reactor correlating submitted transactions with their completion events.
//!
//! Design notes:
//! - `InvokeSubscriptions` owns the registry, every open stream and every in-flight
//!   settlement; nothing is shared, so nothing is locked.
//! - Callers talk to it through cloneable `InvokeHandle`s over a bounded command channel.
//! - Each turn drains stream messages first, then finished settlements, then one command.
//!   An event already delivered by the transport is therefore cached before a registration
//!   sent after it is handled.
//! - Streams are tagged with (address, generation); messages from a torn-down generation
//!   are dropped. A stream that ends is treated as failed.
//! - The reactor returns once all handles are dropped, no expectation is pending and no
//!   settlement is running. Remaining streams are aborted on exit.
//! - An expectation whose `PendingResult` was dropped is no longer pending. It does not
//!   block a later registration of the same hash or keep the reactor alive.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::{mpsc, oneshot};
use futures::future::{self, BoxFuture};
use futures::stream::{self, AbortHandle, BoxStream, FuturesUnordered, SelectAll};
use futures::{FutureExt, SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::config::InvokeConfig;
use crate::invoke::registry::{EventOutcome, Settlement, SubscriptionRegistry};
use crate::invoke::types::{
    result_channel, EventSource, InvokeError, PendingResult, StreamMessage, SubscriptionFilter,
};
use crate::telemetry::InvokeCounters;
use crate::transform::ConfidentialTransform;
use crate::types::{Address, TxHash};

/// Cause reported when a subscription stream ends without an error.
pub const STREAM_CLOSED: &str = "event stream closed";

/// `None` marks the end of the stream.
type Tagged = (Address, u64, Option<StreamMessage>);

#[derive(Debug)]
enum Command {
    Prepare {
        from: Address,
        reply: oneshot::Sender<u64>,
    },
    Register {
        from: Address,
        hash: TxHash,
        destination: Address,
        reply: oneshot::Sender<Result<PendingResult, InvokeError>>,
    },
    Teardown {
        from: Address,
        reply: oneshot::Sender<bool>,
    },
    Counters {
        reply: oneshot::Sender<InvokeCounters>,
    },
}

pub struct InvokeSubscriptions {
    config: InvokeConfig,
    source: Arc<dyn EventSource>,
    transform: ConfidentialTransform,
    registry: SubscriptionRegistry,
    commands: mpsc::Receiver<Command>,
    commands_closed: bool,
    streams: SelectAll<BoxStream<'static, Tagged>>,
    settlements: FuturesUnordered<BoxFuture<'static, bool>>,
}

impl InvokeSubscriptions {
    /// Build a reactor and its first handle. The reactor does nothing until `run` is polled.
    pub fn new(
        config: InvokeConfig,
        source: Arc<dyn EventSource>,
        transform: ConfidentialTransform,
    ) -> (InvokeHandle, Self) {
        let (tx, commands) = mpsc::channel(config.command_buffer);
        let reactor = Self {
            config,
            source,
            transform,
            registry: SubscriptionRegistry::new(),
            commands,
            commands_closed: false,
            streams: SelectAll::new(),
            settlements: FuturesUnordered::new(),
        };
        (InvokeHandle { tx }, reactor)
    }

    /// Drive the reactor to completion on the caller's executor.
    pub async fn run(mut self) {
        debug!(event_type = %self.config.event_type, "invoke reactor started");
        future::poll_fn(|cx| self.poll_turn(cx)).await;
        self.registry.clear();
        debug!("invoke reactor stopped");
    }

    fn poll_turn(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            while let Poll::Ready(Some((from, generation, msg))) = self.streams.poll_next_unpin(cx) {
                self.on_stream_item(from, generation, msg);
            }

            while let Poll::Ready(Some(ok)) = self.settlements.poll_next_unpin(cx) {
                self.registry.record_settlement(ok);
            }

            if !self.commands_closed {
                match self.commands.poll_next_unpin(cx) {
                    Poll::Ready(Some(cmd)) => {
                        self.on_command(cmd);
                        continue;
                    }
                    Poll::Ready(None) => {
                        debug!("all invoke handles dropped");
                        self.commands_closed = true;
                    }
                    Poll::Pending => {}
                }
            }

            if self.commands_closed {
                self.registry.prune_abandoned(cx);
            }
            if self.commands_closed
                && self.registry.pending_expectations() == 0
                && self.settlements.is_empty()
            {
                return Poll::Ready(());
            }
            return Poll::Pending;
        }
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Prepare { from, reply } => {
                let generation = self.get_or_create(from);
                let _ = reply.send(generation);
            }
            Command::Register { from, hash, destination, reply } => {
                if reply.is_canceled() {
                    debug!(%from, %hash, "registration abandoned before handling");
                    return;
                }
                let (resolver, pending) = result_channel();
                let outcome = self
                    .registry
                    .register_expectation(from, hash, destination, resolver)
                    .map(|ready| {
                        if let Some(settlement) = ready {
                            self.spawn_settlement(settlement);
                        }
                        pending
                    });
                if let Err(Ok(_)) = reply.send(outcome) {
                    self.registry.cancel_expectation(from, hash);
                }
            }
            Command::Teardown { from, reply } => {
                let _ = reply.send(self.registry.teardown(from));
            }
            Command::Counters { reply } => {
                let _ = reply.send(self.registry.counters());
            }
        }
    }

    fn get_or_create(&mut self, from: Address) -> u64 {
        let Self { registry, source, config, streams, .. } = self;
        registry.get_or_create(from, |generation| {
            open_stream(&**source, &config.event_type, streams, from, generation)
        })
    }

    fn on_stream_item(&mut self, from: Address, generation: u64, msg: Option<StreamMessage>) {
        if self.registry.generation(&from) != Some(generation) {
            debug!(%from, generation, "dropping message from stale stream");
            return;
        }

        match msg {
            Some(StreamMessage::Data(event)) => {
                if let EventOutcome::Matched(settlement) = self.registry.on_event_received(from, event) {
                    self.spawn_settlement(settlement);
                }
            }
            Some(StreamMessage::Error(cause)) => {
                self.registry.on_stream_error(from, &format!("{:#}", cause));
            }
            None => {
                self.registry.on_stream_error(from, STREAM_CLOSED);
            }
        }
    }

    fn spawn_settlement(&mut self, settlement: Settlement) {
        let transform = self.transform.clone();
        let Settlement { from, hash, destination, event, resolver } = settlement;

        self.settlements.push(
            async move {
                let outcome = transform
                    .resolve_return(&destination, event)
                    .await
                    .map_err(InvokeError::from);
                let ok = outcome.is_ok();
                if let Err(e) = &outcome {
                    warn!(%from, %hash, error = %e, "settlement failed");
                }
                if !resolver.settle(outcome) {
                    debug!(%from, %hash, "result handle dropped before settlement");
                }
                ok
            }
            .boxed(),
        );
    }
}

fn open_stream(
    source: &dyn EventSource,
    event_type: &str,
    streams: &mut SelectAll<BoxStream<'static, Tagged>>,
    from: Address,
    generation: u64,
) -> AbortHandle {
    let raw = source.subscribe(event_type, SubscriptionFilter { from_address: from });
    let (raw, handle) = stream::abortable(raw);
    let tagged = raw
        .map(move |msg| (from, generation, Some(msg)))
        .chain(stream::once(future::ready((from, generation, None))));
    streams.push(tagged.boxed());
    handle
}

/// Cloneable client of an `InvokeSubscriptions` reactor.
#[derive(Clone, Debug)]
pub struct InvokeHandle {
    tx: mpsc::Sender<Command>,
}

impl InvokeHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, InvokeError> {
        let (reply, rx) = oneshot::channel();
        let mut tx = self.tx.clone();
        tx.send(make(reply)).await.map_err(|_| InvokeError::ReactorClosed)?;
        rx.await.map_err(|_| InvokeError::ReactorClosed)
    }

    /// Ensure a subscription for `from` exists. Returns its generation.
    pub async fn get_or_create_subscription(&self, from: Address) -> Result<u64, InvokeError> {
        self.request(|reply| Command::Prepare { from, reply }).await
    }

    /// Await the completion of `hash` sent by `from` to `destination`.
    pub async fn register_expectation(
        &self,
        from: Address,
        hash: TxHash,
        destination: Address,
    ) -> Result<PendingResult, InvokeError> {
        self.request(|reply| Command::Register { from, hash, destination, reply })
            .await?
    }

    /// Subscribe, submit and register in one step.
    ///
    /// The subscription is opened before `submit` runs so the completion event cannot be missed.
    pub async fn invoke<F>(&self, from: Address, to: Address, submit: F) -> Result<PendingResult, InvokeError>
    where
        F: Future<Output = anyhow::Result<TxHash>>,
    {
        self.get_or_create_subscription(from).await?;
        let hash = submit
            .await
            .map_err(|e| InvokeError::Submit(format!("{:#}", e)))?;
        debug!(%from, %to, %hash, "transaction submitted");
        self.register_expectation(from, hash, to).await
    }

    /// Close `from`'s subscription. Returns false when none was active.
    pub async fn teardown(&self, from: Address) -> Result<bool, InvokeError> {
        self.request(|reply| Command::Teardown { from, reply }).await
    }

    pub async fn counters(&self) -> Result<InvokeCounters, InvokeError> {
        self.request(|reply| Command::Counters { reply }).await
    }
}
