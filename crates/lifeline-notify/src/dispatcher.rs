//! Fan-out of one message to every enabled channel.

use std::sync::Arc;

use async_trait::async_trait;
use lifeline_common::LifelineResult;
use lifeline_store::ChannelStore;

use crate::transport::TransportRegistry;

/// Message sent by [`Dispatcher::test_notification`].
pub const TEST_MESSAGE: &str =
    "Test notification from Lifeline. If you receive this, your notification channel is configured correctly.";

/// A channel that failed to receive a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    /// Channel name.
    pub channel: String,
    /// Error description.
    pub error: String,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Names of channels that accepted the message.
    pub delivered: Vec<String>,
    /// Channels that failed.
    pub failed: Vec<ChannelFailure>,
}

impl DispatchReport {
    /// Number of channels a send was attempted on.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Where the classifier sends alerts.
///
/// Implementations never fail: per-channel problems are logged and reported.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to every enabled channel.
    async fn notify(&self, message: &str) -> DispatchReport;
}

/// Resolves enabled channels and sends to each one in turn.
#[derive(Clone)]
pub struct Dispatcher {
    channels: Arc<dyn ChannelStore>,
    transports: TransportRegistry,
}

impl Dispatcher {
    /// Create a dispatcher reading channels from `channels`.
    pub fn new(channels: Arc<dyn ChannelStore>, transports: TransportRegistry) -> Self {
        Self {
            channels,
            transports,
        }
    }

    /// The transport registry in use.
    #[must_use]
    pub const fn transports(&self) -> &TransportRegistry {
        &self.transports
    }

    /// Send `message` to every enabled channel.
    ///
    /// Channels are tried sequentially. A failing channel is logged and
    /// recorded in the report; it never stops the remaining sends and is
    /// never returned as an error.
    pub async fn send(&self, message: &str) -> DispatchReport {
        let mut report = DispatchReport::default();

        let channels = match self.channels.list().await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load notification channels");
                return report;
            }
        };

        if channels.is_empty() {
            tracing::info!("No notification channels configured");
            return report;
        }

        for channel in channels.into_iter().filter(|channel| channel.enabled) {
            match self.send_to_url(&channel.url, message).await {
                Ok(()) => {
                    tracing::info!(channel = %channel.name, "Notification sent");
                    report.delivered.push(channel.name);
                }
                Err(e) => {
                    tracing::warn!(channel = %channel.name, error = %e, "Failed to send notification");
                    report.failed.push(ChannelFailure {
                        channel: channel.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Send one message to one target. Single attempt, no retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is invalid, its scheme has no
    /// transport, or delivery fails.
    pub async fn send_to_url(&self, target: &str, message: &str) -> LifelineResult<()> {
        let (transport, url) = self.transports.resolve(target)?;
        tracing::debug!(transport = transport.name(), "Sending notification");
        transport.send(&url, message).await
    }

    /// Send [`TEST_MESSAGE`] to a target and report the outcome directly.
    ///
    /// # Errors
    ///
    /// Same as [`send_to_url`](Self::send_to_url).
    pub async fn test_notification(&self, target: &str) -> LifelineResult<()> {
        self.send_to_url(target, TEST_MESSAGE).await
    }
}

#[async_trait]
impl Notifier for Dispatcher {
    async fn notify(&self, message: &str) -> DispatchReport {
        self.send(message).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transports", &self.transports)
            .finish_non_exhaustive()
    }
}
