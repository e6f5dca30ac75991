//! Container listing and per-container preferences.

use axum::Json;
use axum::extract::{Path, State};
use lifeline_common::{ContainerId, Entity, LifelineError, Preferences};
use lifeline_monitor::ContainerSummary;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ApiResult;
use super::server::AppState;

/// A runtime container merged with its notification preferences.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerView {
    /// Container ID.
    pub id: String,
    /// Name, without a leading `/`.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Machine state.
    pub state: String,
    /// Human status.
    pub status: String,
    /// Creation time, seconds since the epoch.
    pub created: i64,
    /// Notify when a start is confirmed.
    pub notify_on_success: bool,
    /// Notify on a failed exit.
    pub notify_on_failure: bool,
}

impl ContainerView {
    fn new(summary: ContainerSummary, preferences: Preferences) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            image: summary.image,
            state: summary.state,
            status: summary.status,
            created: summary.created,
            notify_on_success: preferences.notify_on_success,
            notify_on_failure: preferences.notify_on_failure,
        }
    }
}

/// Body of `PUT /api/containers/{id}`; missing flags keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct PreferencesBody {
    notify_on_success: Option<bool>,
    notify_on_failure: Option<bool>,
}

impl PreferencesBody {
    fn merge_over(&self, current: Preferences) -> Preferences {
        Preferences {
            notify_on_success: self.notify_on_success.unwrap_or(current.notify_on_success),
            notify_on_failure: self.notify_on_failure.unwrap_or(current.notify_on_failure),
        }
    }
}

fn preferences_of(entities: &[Entity], id: &str) -> Preferences {
    entities
        .iter()
        .find(|entity| entity.id.as_str() == id)
        .map(|entity| entity.preferences)
        .unwrap_or_default()
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ContainerView>>> {
    let containers = state.runtime.list().await?;
    let entities = state.registry.list().await?;

    Ok(Json(
        containers
            .into_iter()
            .map(|summary| {
                let preferences = preferences_of(&entities, &summary.id);
                ContainerView::new(summary, preferences)
            })
            .collect(),
    ))
}

/// Look a container up in the runtime listing by full id or name.
async fn find_container(state: &AppState, id: &str) -> ApiResult<Option<ContainerSummary>> {
    Ok(state
        .runtime
        .list()
        .await?
        .into_iter()
        .find(|container| container.id == id || container.name == id))
}

pub(super) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContainerView>> {
    let summary = find_container(&state, &id)
        .await?
        .ok_or(LifelineError::EntityNotFound { id })?;

    let preferences = state
        .registry
        .preferences(&ContainerId::new(summary.id.as_str())?)
        .await?;

    Ok(Json(ContainerView::new(summary, preferences)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PreferencesBody>,
) -> ApiResult<Json<Value>> {
    // Registered entities are always keyed by the runtime's full id.
    let (id, current) = match find_container(&state, &id).await? {
        Some(summary) => {
            let id = ContainerId::new(summary.id.as_str())?;
            let entity = match state.registry.find(&id).await? {
                Some(entity) => entity,
                None => {
                    state
                        .registry
                        .upsert(&id, &summary.name, &summary.image)
                        .await?
                }
            };
            (id, entity)
        }
        None => {
            // Removed containers keep their registered preferences editable.
            let id = ContainerId::new(id)?;
            let entity = state
                .registry
                .find(&id)
                .await?
                .ok_or_else(|| LifelineError::EntityNotFound { id: id.to_string() })?;
            (id, entity)
        }
    };

    let entity = state
        .registry
        .set_preferences(&id, body.merge_over(current.preferences))
        .await?;

    tracing::info!(
        container_id = %id.short(),
        notify_on_success = entity.preferences.notify_on_success,
        notify_on_failure = entity.preferences.notify_on_failure,
        "Container preferences updated"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Container settings updated",
        "container": entity,
    })))
}
