//! Entity registry capability.

use async_trait::async_trait;
use lifeline_common::{ContainerId, Entity, LifecycleState, LifelineResult, Preferences};

/// Durable record of known containers and their notification preferences.
///
/// A missing record is a valid state: the container is unknown and
/// [`Preferences::default`] applies.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Register a container, or refresh its name and image.
    ///
    /// New entities get default preferences. Existing preferences and status
    /// are never touched here.
    async fn upsert(&self, id: &ContainerId, name: &str, image: &str) -> LifelineResult<Entity>;

    /// Look up one entity.
    async fn find(&self, id: &ContainerId) -> LifelineResult<Option<Entity>>;

    /// All known entities.
    async fn list(&self) -> LifelineResult<Vec<Entity>>;

    /// Record the latest lifecycle state. Unknown ids are left alone.
    async fn set_status(&self, id: &ContainerId, status: LifecycleState) -> LifelineResult<()>;

    /// Replace the notification preferences of a registered entity.
    ///
    /// # Errors
    ///
    /// [`lifeline_common::LifelineError::EntityNotFound`] if the id is unknown.
    async fn set_preferences(
        &self,
        id: &ContainerId,
        preferences: Preferences,
    ) -> LifelineResult<Entity>;

    /// Preferences for an id, falling back to the defaults for unknown ids.
    async fn preferences(&self, id: &ContainerId) -> LifelineResult<Preferences> {
        Ok(self
            .find(id)
            .await?
            .map(|entity| entity.preferences)
            .unwrap_or_default())
    }
}
