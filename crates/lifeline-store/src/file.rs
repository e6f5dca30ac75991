//! File-backed store.
//!
//! Layout under the data directory:
//! - `entities/<container-id>.json`
//! - `channels/<channel-id>.json`
//! - `events.db` (SQLite audit log)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lifeline_common::{
    ContainerId, Entity, EventRecord, LifecycleState, LifelineError, LifelinePaths,
    LifelineResult, NotificationChannel, Preferences, RecordId,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::audit::{AuditQuery, AuditStore};
use crate::channel::{ChannelStore, ChannelUpdate};
use crate::registry::EntityRegistry;
use crate::sqlite::SqliteAuditLog;

/// Store implementing every capability on top of a data directory.
#[derive(Debug)]
pub struct FileStore {
    paths: LifelinePaths,
    audit: SqliteAuditLog,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `paths`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or the audit
    /// database cannot be opened.
    pub fn open(paths: LifelinePaths) -> LifelineResult<Self> {
        paths.create_dirs()?;
        let audit = SqliteAuditLog::open(&paths.audit_db())?;

        tracing::debug!(root = %paths.root.display(), "Opened file store");

        Ok(Self {
            paths,
            audit,
            write_lock: Mutex::new(()),
        })
    }

    /// Paths used by this store.
    #[must_use]
    pub const fn paths(&self) -> &LifelinePaths {
        &self.paths
    }

    fn channel_path(&self, id: &RecordId) -> LifelineResult<PathBuf> {
        if !id.is_well_formed() {
            return Err(LifelineError::ChannelNotFound { id: id.to_string() });
        }
        Ok(self.paths.channel(id.as_str()))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> LifelineResult<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> LifelineResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::trace!(path = %path.display(), "Wrote record");
    Ok(())
}

async fn read_dir_json<T: DeserializeOwned>(dir: &Path) -> LifelineResult<Vec<T>> {
    let mut items = Vec::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(items),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(item) = read_json(&path).await? {
                items.push(item);
            }
        }
    }

    Ok(items)
}

#[async_trait]
impl EntityRegistry for FileStore {
    async fn upsert(&self, id: &ContainerId, name: &str, image: &str) -> LifelineResult<Entity> {
        let _guard = self.write_lock.lock().await;
        let path = self.paths.entity(id.as_str());

        let entity = match read_json::<Entity>(&path).await? {
            Some(mut existing) => {
                existing.name = lifeline_common::model::display_name(name).to_string();
                existing.image = image.to_string();
                tracing::debug!(container_id = %id.short(), "Updated container record");
                existing
            }
            None => {
                tracing::info!(
                    container_id = %id.short(),
                    name = %name,
                    image = %image,
                    "Registered container with default preferences"
                );
                Entity::new(id.clone(), name, image)
            }
        };

        write_json(&path, &entity).await?;
        Ok(entity)
    }

    async fn find(&self, id: &ContainerId) -> LifelineResult<Option<Entity>> {
        read_json(&self.paths.entity(id.as_str())).await
    }

    async fn list(&self) -> LifelineResult<Vec<Entity>> {
        let mut entities: Vec<Entity> = read_dir_json(&self.paths.entities()).await?;
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entities)
    }

    async fn set_status(&self, id: &ContainerId, status: LifecycleState) -> LifelineResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.paths.entity(id.as_str());

        if let Some(mut entity) = read_json::<Entity>(&path).await? {
            entity.status = status;
            write_json(&path, &entity).await?;
        }

        Ok(())
    }

    async fn set_preferences(
        &self,
        id: &ContainerId,
        preferences: Preferences,
    ) -> LifelineResult<Entity> {
        let _guard = self.write_lock.lock().await;
        let path = self.paths.entity(id.as_str());

        let mut entity = read_json::<Entity>(&path)
            .await?
            .ok_or_else(|| LifelineError::EntityNotFound { id: id.to_string() })?;

        entity.preferences = preferences;
        write_json(&path, &entity).await?;

        tracing::info!(
            container_id = %id.short(),
            notify_on_success = preferences.notify_on_success,
            notify_on_failure = preferences.notify_on_failure,
            "Updated notification preferences"
        );

        Ok(entity)
    }
}

#[async_trait]
impl AuditStore for FileStore {
    async fn append(&self, record: EventRecord) -> LifelineResult<()> {
        self.audit.append(record).await
    }

    async fn query(&self, query: AuditQuery) -> LifelineResult<Vec<EventRecord>> {
        self.audit.query(query).await
    }

    async fn count(&self) -> LifelineResult<usize> {
        self.audit.count().await
    }
}

#[async_trait]
impl ChannelStore for FileStore {
    async fn list(&self) -> LifelineResult<Vec<NotificationChannel>> {
        let mut channels: Vec<NotificationChannel> =
            read_dir_json(&self.paths.channels()).await?;
        channels.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(channels)
    }

    async fn get(&self, id: &RecordId) -> LifelineResult<NotificationChannel> {
        read_json(&self.channel_path(id)?)
            .await?
            .ok_or_else(|| LifelineError::ChannelNotFound { id: id.to_string() })
    }

    async fn create(&self, channel: NotificationChannel) -> LifelineResult<NotificationChannel> {
        let path = self.channel_path(&channel.id)?;
        let _guard = self.write_lock.lock().await;

        write_json(&path, &channel).await?;
        tracing::info!(channel = %channel.name, kind = %channel.kind, "Created notification channel");

        Ok(channel)
    }

    async fn update(
        &self,
        id: &RecordId,
        update: ChannelUpdate,
    ) -> LifelineResult<NotificationChannel> {
        let path = self.channel_path(id)?;
        let _guard = self.write_lock.lock().await;

        let mut channel: NotificationChannel = read_json(&path)
            .await?
            .ok_or_else(|| LifelineError::ChannelNotFound { id: id.to_string() })?;

        update.apply_to(&mut channel);
        write_json(&path, &channel).await?;

        Ok(channel)
    }

    async fn delete(&self, id: &RecordId) -> LifelineResult<()> {
        let path = self.channel_path(id)?;
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(channel_id = %id, "Deleted notification channel");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LifelineError::ChannelNotFound { id: id.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }
}
