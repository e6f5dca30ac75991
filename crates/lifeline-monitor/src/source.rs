//! Event source adapter.
//!
//! Reads the runtime subscription on its own task and forwards container
//! events and transport errors on two separate channels. Non-container
//! events are dropped here.

use futures::StreamExt;
use futures::stream::BoxStream;
use lifeline_common::{LifelineError, LifelineResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::runtime::{ContainerRuntime, RawEvent};

const ERROR_BUFFER: usize = 16;

/// Receiving ends of a running runtime subscription.
///
/// Both channels close when the subscription ends or the token is cancelled.
#[derive(Debug)]
pub struct EventSource {
    /// Container events, in arrival order.
    pub events: mpsc::Receiver<RawEvent>,
    /// Transport errors reported by the subscription.
    pub errors: mpsc::Receiver<LifelineError>,
    task: JoinHandle<()>,
}

impl EventSource {
    /// Subscribe to `runtime` and start forwarding.
    #[must_use]
    pub fn spawn(
        runtime: &dyn ContainerRuntime,
        buffer: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self::from_stream(runtime.subscribe(), buffer, cancel)
    }

    /// Start forwarding from an existing stream.
    #[must_use]
    pub fn from_stream(
        stream: BoxStream<'static, LifelineResult<RawEvent>>,
        buffer: usize,
        cancel: CancellationToken,
    ) -> Self {
        let (event_tx, events) = mpsc::channel(buffer.max(1));
        let (error_tx, errors) = mpsc::channel(ERROR_BUFFER);
        let task = tokio::spawn(forward(stream, event_tx, error_tx, cancel));

        Self {
            events,
            errors,
            task,
        }
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn forward(
    mut stream: BoxStream<'static, LifelineResult<RawEvent>>,
    event_tx: mpsc::Sender<RawEvent>,
    error_tx: mpsc::Sender<LifelineError>,
    cancel: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            () = cancel.cancelled() => break,
            item = stream.next() => item,
        };

        match item {
            Some(Ok(event)) if event.is_container() => {
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
            Some(Ok(event)) => {
                tracing::debug!(kind = %event.kind, action = %event.action, "Dropping non-container event");
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Runtime event subscription error");
                if error_tx.send(e).await.is_err() {
                    break;
                }
            }
            None => {
                tracing::warn!("Runtime event subscription ended");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn forwards_only_container_events() {
        let items: Vec<LifelineResult<RawEvent>> = vec![
            Ok(RawEvent::container("create", "a")),
            Ok(RawEvent {
                kind: "image".to_string(),
                ..RawEvent::container("pull", "nginx")
            }),
            Err(LifelineError::runtime("connection reset")),
            Ok(RawEvent::container("start", "a")),
        ];

        let mut source =
            EventSource::from_stream(stream::iter(items).boxed(), 8, CancellationToken::new());

        assert_eq!(source.events.recv().await.unwrap().action, "create");
        assert_eq!(source.events.recv().await.unwrap().action, "start");
        assert!(source.events.recv().await.is_none());

        let err = source.errors.recv().await.unwrap();
        assert!(matches!(err, LifelineError::Runtime { .. }));
        assert!(source.errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancellation_closes_channels() {
        let cancel = CancellationToken::new();
        let mut source =
            EventSource::from_stream(stream::pending().boxed(), 8, cancel.clone());

        cancel.cancel();
        assert!(source.events.recv().await.is_none());
    }
}
