//! Notification channel store capability.

use async_trait::async_trait;
use lifeline_common::{LifelineResult, NotificationChannel, RecordId};
use serde::Deserialize;

/// Partial update of a channel; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChannelUpdate {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New kind label.
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    /// New transport target.
    #[serde(default)]
    pub url: Option<String>,
    /// Enable or disable.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ChannelUpdate {
    /// Apply the update to a channel. Empty strings are ignored.
    pub fn apply_to(self, channel: &mut NotificationChannel) {
        if let Some(name) = self.name.filter(|s| !s.is_empty()) {
            channel.name = name;
        }
        if let Some(kind) = self.kind.filter(|s| !s.is_empty()) {
            channel.kind = kind;
        }
        if let Some(url) = self.url.filter(|s| !s.is_empty()) {
            channel.url = url;
        }
        if let Some(enabled) = self.enabled {
            channel.enabled = enabled;
        }
    }
}

/// Configured notification channels.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// All channels, oldest first.
    async fn list(&self) -> LifelineResult<Vec<NotificationChannel>>;

    /// Channels with `enabled = true`.
    async fn list_enabled(&self) -> LifelineResult<Vec<NotificationChannel>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|channel| channel.enabled)
            .collect())
    }

    /// Fetch one channel.
    ///
    /// # Errors
    ///
    /// [`lifeline_common::LifelineError::ChannelNotFound`] if it does not exist.
    async fn get(&self, id: &RecordId) -> LifelineResult<NotificationChannel>;

    /// Store a new channel.
    async fn create(&self, channel: NotificationChannel) -> LifelineResult<NotificationChannel>;

    /// Update an existing channel.
    async fn update(
        &self,
        id: &RecordId,
        update: ChannelUpdate,
    ) -> LifelineResult<NotificationChannel>;

    /// Remove a channel.
    async fn delete(&self, id: &RecordId) -> LifelineResult<()>;
}
