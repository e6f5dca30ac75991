//! Entities, audit records and notification channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ContainerId, RecordId};

/// Per-container notification preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Notify when a start is confirmed.
    pub notify_on_success: bool,
    /// Notify when a container dies with a non-zero exit code.
    pub notify_on_failure: bool,
}

impl Default for Preferences {
    /// Failure alerts are on by default, success alerts are opt-in.
    fn default() -> Self {
        Self {
            notify_on_success: false,
            notify_on_failure: true,
        }
    }
}

/// Lifecycle states tracked for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    /// Seen a create event.
    Created,
    /// Start seen, waiting for the settle delay. Never persisted.
    StartPending,
    /// Start confirmed after the settle delay.
    Started,
    /// Exited with code 0.
    StoppedGraceful,
    /// Exited with a non-zero (or missing) code.
    StoppedFailed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::StartPending => write!(f, "start-pending"),
            Self::Started => write!(f, "started"),
            Self::StoppedGraceful => write!(f, "stopped-graceful"),
            Self::StoppedFailed => write!(f, "stopped-failed"),
        }
    }
}

/// A container known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Runtime-assigned container ID.
    pub id: ContainerId,
    /// Display name, without the runtime's leading `/`.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Last recorded lifecycle state.
    pub status: LifecycleState,
    /// Notification preferences.
    #[serde(flatten)]
    pub preferences: Preferences,
}

impl Entity {
    /// A freshly registered entity with default preferences.
    pub fn new(id: ContainerId, name: impl AsRef<str>, image: impl Into<String>) -> Self {
        Self {
            id,
            name: display_name(name.as_ref()).to_string(),
            image: image.into(),
            status: LifecycleState::Created,
            preferences: Preferences::default(),
        }
    }
}

/// Strip the leading `/` Docker puts in front of container names.
#[must_use]
pub fn display_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

/// Classified outcome recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// Container created.
    Created,
    /// Start confirmed.
    Started,
    /// Exited with code 0.
    StoppedGraceful,
    /// Exited with a failure code.
    StoppedFailed,
}

impl EventType {
    /// Outcome status of this event type.
    #[must_use]
    pub const fn status(self) -> EventStatus {
        match self {
            Self::Created | Self::Started => EventStatus::Success,
            Self::StoppedGraceful => EventStatus::Stopped,
            Self::StoppedFailed => EventStatus::Failure,
        }
    }

    /// Runtime action that produces this event type.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Created => "create",
            Self::Started => "start",
            Self::StoppedGraceful | Self::StoppedFailed => "die",
        }
    }

    /// Lifecycle state an entity is in after this event.
    #[must_use]
    pub const fn state(self) -> LifecycleState {
        match self {
            Self::Created => LifecycleState::Created,
            Self::Started => LifecycleState::Started,
            Self::StoppedGraceful => LifecycleState::StoppedGraceful,
            Self::StoppedFailed => LifecycleState::StoppedFailed,
        }
    }
}

/// Outcome status of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The container is up.
    Success,
    /// The container exited cleanly.
    Stopped,
    /// The container exited with an error.
    Failure,
}

/// Immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Record ID.
    pub id: RecordId,
    /// Container the event belongs to.
    pub entity_id: ContainerId,
    /// Container name at the time of the event.
    pub entity_name: String,
    /// Classified event type.
    pub event_type: EventType,
    /// Outcome status, derived from the event type.
    pub status: EventStatus,
    /// Runtime action that triggered the record.
    pub action: String,
    /// Human-readable description.
    pub message: String,
    /// When the event was classified.
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Build a record stamped with the current time.
    pub fn new(
        entity_id: ContainerId,
        entity_name: impl Into<String>,
        event_type: EventType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            entity_id,
            entity_name: entity_name.into(),
            event_type,
            status: event_type.status(),
            action: event_type.action().to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Override the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A configured notification transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    /// Channel ID.
    pub id: RecordId,
    /// Operator-chosen name.
    pub name: String,
    /// Free-form label such as `slack` or `webhook`.
    pub kind: String,
    /// Transport target; its URL scheme selects the transport.
    pub url: String,
    /// Disabled channels are skipped by dispatch.
    pub enabled: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl NotificationChannel {
    /// A new, enabled channel.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into(),
            kind: kind.into(),
            url: url.into(),
            enabled: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preferences_alert_on_failure_only() {
        let prefs = Preferences::default();
        assert!(!prefs.notify_on_success);
        assert!(prefs.notify_on_failure);
    }

    #[test]
    fn new_entity_strips_leading_slash() {
        let entity = Entity::new(ContainerId::new("web-1").unwrap(), "/web-1", "nginx:latest");
        assert_eq!(entity.name, "web-1");
        assert_eq!(entity.status, LifecycleState::Created);
        assert_eq!(entity.preferences, Preferences::default());
    }

    #[test]
    fn event_type_derivations() {
        assert_eq!(EventType::Started.status(), EventStatus::Success);
        assert_eq!(EventType::StoppedGraceful.status(), EventStatus::Stopped);
        assert_eq!(EventType::StoppedFailed.status(), EventStatus::Failure);
        assert_eq!(EventType::StoppedFailed.action(), "die");
        assert_eq!(
            EventType::StoppedGraceful.state(),
            LifecycleState::StoppedGraceful
        );
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let record = EventRecord::new(
            ContainerId::new("web-1").unwrap(),
            "web-1",
            EventType::StoppedFailed,
            "Container stopped with exit code 1",
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event_type"], "stopped-failed");
        assert_eq!(json["status"], "failure");
        assert_eq!(json["action"], "die");
        assert_eq!(json["entity_id"], "web-1");
    }

    #[test]
    fn entity_flattens_preferences() {
        let entity = Entity::new(ContainerId::new("web-1").unwrap(), "web-1", "nginx");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["notify_on_failure"], true);
        assert_eq!(json["status"], "created");

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, entity);
    }
}
