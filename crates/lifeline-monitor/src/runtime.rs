//! Container runtime interface.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use lifeline_common::LifelineResult;
use serde::{Deserialize, Serialize};

/// Event kind of container-scoped events.
pub const CONTAINER_EVENT: &str = "container";

/// An event as reported by the runtime, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Object kind (`container`, `image`, `network`, ...).
    pub kind: String,
    /// Action (`create`, `start`, `die`, ...).
    pub action: String,
    /// ID of the object the event is about.
    pub actor_id: String,
    /// Actor attributes; includes `name`, and `exitCode` for `die`.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl RawEvent {
    /// A container event with no attributes.
    pub fn container(action: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            kind: CONTAINER_EVENT.to_string(),
            action: action.into(),
            actor_id: actor_id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the event is scoped to a container.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind == CONTAINER_EVENT
    }

    /// Look up an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Point-in-time state of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    /// Whether the main process is running.
    pub running: bool,
    /// Image reference from the container config.
    pub image: String,
    /// Container name, without a leading `/`.
    pub name: String,
}

/// One row of a container listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    /// Container ID.
    pub id: String,
    /// Primary name, without a leading `/`.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Machine state (`running`, `exited`, ...).
    pub state: String,
    /// Human status (`Up 2 hours`, ...).
    pub status: String,
    /// Creation time, seconds since the epoch.
    pub created: i64,
}

/// What the pipeline needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Subscribe to the runtime event feed.
    ///
    /// Transport errors are yielded as items; the stream ends only when the
    /// connection is lost.
    fn subscribe(&self) -> BoxStream<'static, LifelineResult<RawEvent>>;

    /// Inspect one container.
    async fn inspect(&self, id: &str) -> LifelineResult<ContainerSnapshot>;

    /// List all containers, including stopped ones.
    async fn list(&self) -> LifelineResult<Vec<ContainerSummary>>;

    /// Check that the runtime answers.
    async fn ping(&self) -> LifelineResult<()>;
}
