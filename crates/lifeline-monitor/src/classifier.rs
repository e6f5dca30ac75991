//! Lifecycle classification of container events.
//!
//! | Action  | Outcome |
//! |---------|---------|
//! | `create`| entity registered, status `created`, nothing audited |
//! | `start` | settle delay, re-inspect; running → `started` + audit, else discarded |
//! | `die`   | `exitCode` 0 → `stopped-graceful`, anything else → `stopped-failed` |
//!
//! Every step after inspection is best-effort: store and dispatch problems
//! are logged and the step skipped, so one event can never wedge the next.

use std::sync::Arc;

use lifeline_common::{
    ContainerId, Entity, EventRecord, EventType, LifecycleState, Preferences,
};
use lifeline_notify::Notifier;
use lifeline_store::{AuditStore, EntityRegistry};

use crate::config::MonitorConfig;
use crate::runtime::{ContainerRuntime, ContainerSnapshot, RawEvent};

/// Exit code reported when a `die` event carries none.
const UNKNOWN_EXIT_CODE: &str = "unknown";

/// Result of classifying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `create`: entity registered or refreshed.
    Registered,
    /// `start` confirmed after the settle delay.
    Started,
    /// `start` that was no longer running after the settle delay.
    Transient,
    /// `die` with exit code 0.
    StoppedGraceful,
    /// `die` with any other (or a missing) exit code.
    Failed {
        /// Exit code as reported, or `unknown`.
        exit_code: String,
    },
    /// Action the pipeline does not handle.
    Ignored,
    /// Processing stopped early (bad id or inspect failure).
    Aborted,
}

/// The lifecycle state machine.
pub struct Classifier {
    runtime: Arc<dyn ContainerRuntime>,
    registry: Arc<dyn EntityRegistry>,
    audit: Arc<dyn AuditStore>,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
}

impl Classifier {
    /// Create a classifier over the given capabilities.
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        registry: Arc<dyn EntityRegistry>,
        audit: Arc<dyn AuditStore>,
        notifier: Arc<dyn Notifier>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            runtime,
            registry,
            audit,
            notifier,
            config,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Classify one container event and apply its side effects.
    ///
    /// Never fails; problems are logged and reflected in the outcome.
    pub async fn classify(&self, event: &RawEvent) -> Outcome {
        let id = match ContainerId::new(event.actor_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(action = %event.action, error = %e, "Skipping event with invalid container id");
                return Outcome::Aborted;
            }
        };

        tracing::info!(container_id = %id.short(), action = %event.action, "Container event");

        match event.action.as_str() {
            "create" => self.on_create(&id, event).await,
            "start" => self.on_start(&id, event).await,
            "die" => self.on_die(&id, event).await,
            other => {
                tracing::trace!(container_id = %id.short(), action = other, "Ignoring action");
                Outcome::Ignored
            }
        }
    }

    async fn on_create(&self, id: &ContainerId, event: &RawEvent) -> Outcome {
        let Some(snapshot) = self.inspect(id).await else {
            return Outcome::Aborted;
        };

        let name = snapshot_name(&snapshot, event, id);
        if let Err(e) = self.registry.upsert(id, &name, &snapshot.image).await {
            tracing::error!(container_id = %id.short(), error = %e, "Failed to register container");
        }
        self.set_status(id, LifecycleState::Created).await;

        tracing::info!(container_id = %id.short(), name = %name, image = %snapshot.image, "Container registered");
        Outcome::Registered
    }

    async fn on_start(&self, id: &ContainerId, event: &RawEvent) -> Outcome {
        tracing::debug!(
            container_id = %id.short(),
            state = %LifecycleState::StartPending,
            delay_ms = u64::try_from(self.config.settle_delay.as_millis()).unwrap_or(u64::MAX),
            "Waiting for container to settle"
        );
        tokio::time::sleep(self.config.settle_delay).await;

        let Some(snapshot) = self.inspect(id).await else {
            return Outcome::Aborted;
        };

        if !snapshot.running {
            tracing::info!(container_id = %id.short(), "Container exited during settle delay, discarding start");
            return Outcome::Transient;
        }

        let registered = match self
            .registry
            .upsert(id, &snapshot_name(&snapshot, event, id), &snapshot.image)
            .await
        {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::error!(container_id = %id.short(), error = %e, "Failed to register container");
                None
            }
        };
        self.set_status(id, LifecycleState::Started).await;

        let name = entity_name(event, registered.as_ref(), id);
        self.record(id, &name, EventType::Started, "Container started successfully")
            .await;

        let preferences = match registered {
            Some(entity) => Some(entity.preferences),
            None => self.preferences(id).await,
        };
        if preferences.is_some_and(|p| p.notify_on_success) {
            self.notifier
                .notify(&format!("Container '{name}' started successfully"))
                .await;
        }

        Outcome::Started
    }

    async fn on_die(&self, id: &ContainerId, event: &RawEvent) -> Outcome {
        let existing = match self.registry.find(id).await {
            Ok(entity) => Ok(entity),
            Err(e) => {
                tracing::error!(container_id = %id.short(), error = %e, "Failed to look up container");
                Err(())
            }
        };
        let known = existing.as_ref().ok().and_then(Option::as_ref);
        let name = entity_name(event, known, id);

        let exit_code = event.attribute("exitCode").unwrap_or(UNKNOWN_EXIT_CODE);
        let (event_type, message) = if exit_code == "0" {
            (
                EventType::StoppedGraceful,
                "Container stopped gracefully".to_string(),
            )
        } else {
            (
                EventType::StoppedFailed,
                format!("Container stopped with exit code {exit_code}"),
            )
        };

        if known.is_some() {
            self.set_status(id, event_type.state()).await;
        }
        self.record(id, &name, event_type, message).await;

        if event_type == EventType::StoppedGraceful {
            return Outcome::StoppedGraceful;
        }

        // A failed lookup means the preferences are unknown too.
        let preferences = existing.map(|entity| entity.map(|e| e.preferences).unwrap_or_default());
        if preferences.is_ok_and(|p| p.notify_on_failure) {
            self.notifier
                .notify(&format!("Container '{name}' failed. Exit code: {exit_code}"))
                .await;
        }

        Outcome::Failed {
            exit_code: exit_code.to_string(),
        }
    }

    async fn inspect(&self, id: &ContainerId) -> Option<ContainerSnapshot> {
        match self.runtime.inspect(id.as_str()).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(container_id = %id.short(), error = %e, "Failed to inspect container");
                None
            }
        }
    }

    async fn set_status(&self, id: &ContainerId, status: LifecycleState) {
        if let Err(e) = self.registry.set_status(id, status).await {
            tracing::error!(container_id = %id.short(), status = %status, error = %e, "Failed to update container status");
        }
    }

    async fn record(
        &self,
        id: &ContainerId,
        name: &str,
        event_type: EventType,
        message: impl Into<String>,
    ) {
        let record = EventRecord::new(id.clone(), name, event_type, message);
        if let Err(e) = self.audit.append(record).await {
            tracing::error!(container_id = %id.short(), error = %e, "Failed to append audit record");
        }
    }

    async fn preferences(&self, id: &ContainerId) -> Option<Preferences> {
        match self.registry.preferences(id).await {
            Ok(preferences) => Some(preferences),
            Err(e) => {
                tracing::error!(container_id = %id.short(), error = %e, "Failed to load preferences");
                None
            }
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Name for registration: the inspected name, then the event attribute.
fn snapshot_name(snapshot: &ContainerSnapshot, event: &RawEvent, id: &ContainerId) -> String {
    if snapshot.name.is_empty() {
        entity_name(event, None, id)
    } else {
        snapshot.name.clone()
    }
}

/// Name snapshot for audit records and messages.
fn entity_name(event: &RawEvent, registered: Option<&Entity>, id: &ContainerId) -> String {
    event
        .attribute("name")
        .filter(|name| !name.is_empty())
        .map(|name| lifeline_common::model::display_name(name).to_string())
        .or_else(|| {
            registered
                .map(|entity| entity.name.clone())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| id.short().to_string())
}
