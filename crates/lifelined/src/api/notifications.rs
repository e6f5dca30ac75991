//! Notification channel management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lifeline_common::{NotificationChannel, RecordId};
use lifeline_store::ChannelUpdate;
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{ApiError, ApiResult};
use super::server::AppState;

/// Body of `POST /api/notifications`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateChannel {
    #[serde(default)]
    name: String,
    #[serde(default, alias = "type")]
    kind: String,
    #[serde(default)]
    url: String,
}

/// Body of `POST /api/notifications/test`.
#[derive(Debug, Default, Deserialize)]
pub struct TestRequest {
    #[serde(default)]
    url: String,
}

pub(super) async fn list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<NotificationChannel>>> {
    Ok(Json(state.channels.list().await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateChannel>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if body.name.is_empty() || body.kind.is_empty() || body.url.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, type, and URL are required".to_string(),
        ));
    }

    let channel = state
        .channels
        .create(NotificationChannel::new(body.name, body.kind, body.url))
        .await?;
    tracing::info!(channel = %channel.name, id = %channel.id, "Notification channel created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Notification channel created",
            "id": channel.id,
        })),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ChannelUpdate>,
) -> ApiResult<Json<Value>> {
    let channel = state
        .channels
        .update(&RecordId::from_string(id), update)
        .await?;
    tracing::info!(channel = %channel.name, enabled = channel.enabled, "Notification channel updated");

    Ok(Json(json!({
        "success": true,
        "message": "Notification channel updated",
        "channel": channel,
    })))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.channels.delete(&RecordId::from_string(id)).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification channel deleted",
    })))
}

pub(super) async fn test(
    State(state): State<AppState>,
    Json(body): Json<TestRequest>,
) -> Result<Json<Value>, Response> {
    if body.url.is_empty() {
        return Err(ApiError::BadRequest("URL is required".to_string()).into_response());
    }

    match state.dispatcher.test_notification(&body.url).await {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "Test notification sent successfully",
        }))),
        Err(e) => {
            tracing::warn!(error = %e, "Test notification failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response())
        }
    }
}
