// ## 📂 File: `src/transform/stream.rs`

//! transform/stream.rs
//! Decrypting adapters over raw transport streams.
//!
//! - Completed-transaction streams are bound to at most one contract address; its
//!   confidentiality is looked up on the first event and cached once known.
//! - An oracle failure is emitted as an error item and retried on the next event.
//! - Without an address the stream is treated as non-confidential.

use futures::stream::{self, BoxStream, StreamExt};

use crate::invoke::{EventStream, StreamMessage};
use crate::transform::confidential::ConfidentialTransform;
use crate::transform::types::{CompletedTransaction, Log, TransformError};
use crate::types::Address;

struct CompletedState {
    inner: EventStream,
    transform: ConfidentialTransform,
    address: Option<Address>,
    confidential: Option<bool>,
}

impl CompletedState {
    async fn confidentiality(&mut self) -> Result<bool, TransformError> {
        let Some(address) = self.address else {
            return Ok(false);
        };
        if let Some(flag) = self.confidential {
            return Ok(flag);
        }
        let flag = self.transform.is_confidential(&address).await?;
        self.confidential = Some(flag);
        Ok(flag)
    }

    async fn transform_event(
        &mut self,
        mut event: CompletedTransaction,
    ) -> Result<CompletedTransaction, TransformError> {
        if self.confidentiality().await? {
            event.return_data = self.transform.decrypt_return_data(&event.return_data).await?;
        }
        Ok(event)
    }
}

/// Wrap a raw completed-transaction stream, decrypting `returnData` for a confidential
/// `address`.
pub fn decrypting_completed_transactions(
    transform: ConfidentialTransform,
    inner: EventStream,
    address: Option<Address>,
) -> BoxStream<'static, Result<CompletedTransaction, TransformError>> {
    let state = CompletedState { inner, transform, address, confidential: None };

    stream::unfold(state, |mut state| async move {
        let item = match state.inner.next().await? {
            StreamMessage::Data(event) => state.transform_event(event).await,
            StreamMessage::Error(cause) => Err(TransformError::Upstream(format!("{:#}", cause))),
        };
        Some((item, state))
    })
    .boxed()
}

/// Wrap a raw log stream, decrypting the data of logs emitted by confidential contracts.
pub fn decrypting_logs(
    transform: ConfidentialTransform,
    inner: BoxStream<'static, Log>,
) -> BoxStream<'static, Result<Log, TransformError>> {
    inner
        .then(move |log| {
            let transform = transform.clone();
            async move { transform.decrypt_log(log).await }
        })
        .boxed()
}
