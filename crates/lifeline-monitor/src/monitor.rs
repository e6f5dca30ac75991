//! The single consumer of runtime events.

use std::sync::Arc;

use lifeline_common::{LifelineError, LifelineResult};
use tokio_util::sync::CancellationToken;

use crate::classifier::Classifier;
use crate::runtime::ContainerRuntime;
use crate::source::EventSource;

/// Drives the classifier from the runtime event feed until cancelled.
pub struct Monitor {
    runtime: Arc<dyn ContainerRuntime>,
    classifier: Classifier,
    cancel: CancellationToken,
}

impl Monitor {
    /// Create a monitor.
    pub fn new(runtime: Arc<dyn ContainerRuntime>, classifier: Classifier) -> Self {
        Self {
            runtime,
            classifier,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request a stop. An event already being classified is finished first.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Process events in arrival order until cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`LifelineError::EventStreamClosed`] if the runtime
    /// subscription ends without a cancellation.
    pub async fn run(&self) -> LifelineResult<()> {
        let mut source = EventSource::spawn(
            self.runtime.as_ref(),
            self.classifier.config().event_buffer,
            self.cancel.child_token(),
        );

        tracing::info!("Monitoring container events");

        loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    tracing::info!("Monitor stopped");
                    return Ok(());
                }
                Some(event) = source.events.recv() => {
                    let outcome = self.classifier.classify(&event).await;
                    tracing::debug!(container_id = %event.actor_id, ?outcome, "Event classified");
                }
                Some(err) = source.errors.recv() => {
                    tracing::error!(error = %err, "Runtime event stream error");
                }
                else => {
                    tracing::error!("Runtime event stream closed");
                    return Err(LifelineError::EventStreamClosed);
                }
            }
        }
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("classifier", &self.classifier)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
