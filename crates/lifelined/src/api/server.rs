//! Router, shared state and the server loop.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use lifeline_monitor::ContainerRuntime;
use lifeline_notify::Dispatcher;
use lifeline_store::{AuditStore, ChannelStore, EntityRegistry, FileStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::error::ApiResult;
use super::{containers, events, notifications};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Container runtime, for listings and lookups.
    pub runtime: Arc<dyn ContainerRuntime>,
    /// Entity registry.
    pub registry: Arc<dyn EntityRegistry>,
    /// Audit log.
    pub audit: Arc<dyn AuditStore>,
    /// Notification channels.
    pub channels: Arc<dyn ChannelStore>,
    /// Dispatcher, for test notifications.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// State backed by one file store.
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        store: &Arc<FileStore>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            runtime,
            registry: store.clone(),
            audit: store.clone(),
            channels: store.clone(),
            dispatcher,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Build the configuration API router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/setup/status", get(setup_status))
        .route("/api/stats", get(stats))
        .route("/api/containers", get(containers::list))
        .route(
            "/api/containers/{id}",
            get(containers::get).put(containers::update),
        )
        .route(
            "/api/notifications",
            get(notifications::list).post(notifications::create),
        )
        .route("/api/notifications/test", post(notifications::test))
        .route(
            "/api/notifications/{id}",
            put(notifications::update).delete(notifications::delete),
        )
        .route("/api/events", get(events::recent))
        .route("/api/events/{container_id}", get(events::for_container))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "lifeline",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn setup_status(State(state): State<AppState>) -> Json<Value> {
    let configured = match state.channels.list().await {
        Ok(channels) => !channels.is_empty(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load notification channels");
            false
        }
    };

    Json(json!({
        "setup_complete": configured,
        "needs_setup": !configured,
    }))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let containers = state.registry.list().await?.len();
    let notifications = state.channels.list().await?.len();
    let events = state.audit.count().await?;

    Ok(Json(json!({
        "containers_count": containers,
        "notifications_count": notifications,
        "events_count": events,
    })))
}
