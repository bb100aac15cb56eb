// ## 📂 File: `src/invoke/types.rs`

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::stream::BoxStream;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::{CompletedTransaction, TransformError};
use crate::types::{Address, TxHash};

/// Message delivered by a transport subscription.
#[derive(Debug)]
pub enum StreamMessage {
    Data(CompletedTransaction),
    Error(anyhow::Error),
}

pub type EventStream = BoxStream<'static, StreamMessage>;

/// Filter passed to the transport when opening a completion subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
    pub from_address: Address,
}

/// Transport-side subscription factory.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, event_type: &str, filter: SubscriptionFilter) -> EventStream;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// A result for this hash is already awaited on this address.
    #[error("already expecting transaction {hash} from {address}")]
    DuplicateExpectation { address: Address, hash: TxHash },

    /// No active subscription for the sender address.
    #[error("subscription not found for {address}")]
    SubscriptionNotFound { address: Address },

    /// The subscription stream failed; every pending result of the address is rejected.
    #[error("expected transaction could not be satisfied because subscription for {address} failed: {cause}")]
    Transport { address: Address, cause: String },

    /// The subscription was torn down explicitly while results were pending.
    #[error("subscription for {address} was closed")]
    SubscriptionClosed { address: Address },

    /// Confidentiality check or decryption of the return data failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Submitting the transaction failed before a hash was known.
    #[error("transaction submission failed: {0}")]
    Submit(String),

    /// The reactor is gone; no further results can be delivered.
    #[error("invoke reactor closed")]
    ReactorClosed,
}

pub type InvokeResult = Result<Vec<u8>, InvokeError>;

/// Sending half of a result handle. Consumed on settlement, so it settles at most once.
#[derive(Debug)]
pub struct ResultResolver {
    tx: oneshot::Sender<InvokeResult>,
}

impl ResultResolver {
    /// Deliver `outcome`. Returns false when the caller already dropped its handle.
    pub fn settle(self, outcome: InvokeResult) -> bool {
        self.tx.send(outcome).is_ok()
    }

    pub fn resolve(self, return_data: Vec<u8>) -> bool {
        self.settle(Ok(return_data))
    }

    pub fn reject(self, err: InvokeError) -> bool {
        self.settle(Err(err))
    }

    /// True once the matching `PendingResult` has been dropped.
    pub fn is_canceled(&self) -> bool {
        self.tx.is_canceled()
    }

    /// Ready once the matching `PendingResult` has been dropped; registers `cx` otherwise.
    pub fn poll_canceled(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        self.tx.poll_canceled(cx)
    }
}

/// Caller-side result of an invocation.
#[derive(Debug)]
pub struct PendingResult {
    rx: oneshot::Receiver<InvokeResult>,
}

impl PendingResult {
    /// Non-blocking peek: `None` while still pending.
    pub fn try_result(&mut self) -> Option<InvokeResult> {
        match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(Err(InvokeError::ReactorClosed)),
        }
    }
}

impl Future for PendingResult {
    type Output = InvokeResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(|res| match res {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Err(InvokeError::ReactorClosed),
        })
    }
}

/// New single-fulfillment result handle pair.
pub fn result_channel() -> (ResultResolver, PendingResult) {
    let (tx, rx) = oneshot::channel();
    (ResultResolver { tx }, PendingResult { rx })
}
