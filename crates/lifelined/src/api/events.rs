//! Audit log queries.

use axum::Json;
use axum::extract::{Path, State};
use lifeline_common::{ContainerId, EventRecord};
use lifeline_store::AuditQuery;

use super::error::ApiResult;
use super::server::AppState;

pub(super) async fn recent(State(state): State<AppState>) -> ApiResult<Json<Vec<EventRecord>>> {
    Ok(Json(state.audit.query(AuditQuery::recent()).await?))
}

pub(super) async fn for_container(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
) -> ApiResult<Json<Vec<EventRecord>>> {
    let id = ContainerId::new(container_id)?;
    Ok(Json(state.audit.query(AuditQuery::for_entity(id)).await?))
}
