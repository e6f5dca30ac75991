//! Docker Engine runtime (via bollard).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::models::EventMessage;
use bollard::system::EventsOptions;
use futures::StreamExt;
use futures::stream::BoxStream;
use lifeline_common::model::display_name;
use lifeline_common::{LifelineError, LifelineResult};

use crate::runtime::{ContainerRuntime, ContainerSnapshot, ContainerSummary, RawEvent};

/// [`ContainerRuntime`] backed by the Docker Engine API.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to a Docker socket.
    ///
    /// The connection is lazy; call [`ContainerRuntime::ping`] to verify it.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket path is unusable.
    pub fn connect(socket: &Path, timeout_secs: u64) -> LifelineResult<Self> {
        let path = socket.to_str().ok_or_else(|| LifelineError::Config {
            message: format!("Docker socket path is not UTF-8: {}", socket.display()),
        })?;

        let docker = Docker::connect_with_socket(path, timeout_secs, bollard::API_DEFAULT_VERSION)
            .map_err(map_error)?;

        tracing::debug!(socket = %path, "Configured Docker client");
        Ok(Self { docker })
    }

    /// Connect using `DOCKER_HOST` or the platform default socket.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable default exists.
    pub fn connect_with_defaults(timeout_secs: u64) -> LifelineResult<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(map_error)?
            .with_timeout(Duration::from_secs(timeout_secs));

        tracing::debug!("Configured Docker client from local defaults");
        Ok(Self { docker })
    }
}

fn map_error(err: bollard::errors::Error) -> LifelineError {
    LifelineError::runtime(err.to_string())
}

fn raw_event(message: EventMessage) -> RawEvent {
    let actor = message.actor.unwrap_or_default();

    RawEvent {
        kind: message
            .typ
            .map_or_else(|| "unknown".to_string(), |typ| typ.to_string()),
        action: message.action.unwrap_or_default(),
        actor_id: actor.id.unwrap_or_default(),
        attributes: actor.attributes.unwrap_or_default(),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    fn subscribe(&self) -> BoxStream<'static, LifelineResult<RawEvent>> {
        self.docker
            .events(None::<EventsOptions<String>>)
            .map(|item| item.map(raw_event).map_err(map_error))
            .boxed()
    }

    async fn inspect(&self, id: &str) -> LifelineResult<ContainerSnapshot> {
        let response = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|err| match err {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => LifelineError::EntityNotFound { id: id.to_string() },
                other => map_error(other),
            })?;

        Ok(ContainerSnapshot {
            running: response
                .state
                .and_then(|state| state.running)
                .unwrap_or(false),
            image: response
                .config
                .and_then(|config| config.image)
                .unwrap_or_default(),
            name: display_name(response.name.as_deref().unwrap_or_default()).to_string(),
        })
    }

    async fn list(&self) -> LifelineResult<Vec<ContainerSummary>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(map_error)?;

        Ok(containers
            .into_iter()
            .map(|container| ContainerSummary {
                id: container.id.unwrap_or_default(),
                name: container
                    .names
                    .and_then(|names| names.into_iter().next())
                    .map(|name| display_name(&name).to_string())
                    .unwrap_or_default(),
                image: container.image.unwrap_or_default(),
                state: container.state.unwrap_or_default(),
                status: container.status.unwrap_or_default(),
                created: container.created.unwrap_or_default(),
            })
            .collect())
    }

    async fn ping(&self) -> LifelineResult<()> {
        self.docker.ping().await.map_err(map_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{EventActor, EventMessageTypeEnum};
    use std::collections::HashMap;

    #[test]
    fn converts_event_messages() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("die".to_string()),
            actor: Some(EventActor {
                id: Some("abc123".to_string()),
                attributes: Some(HashMap::from([
                    ("name".to_string(), "web-1".to_string()),
                    ("exitCode".to_string(), "1".to_string()),
                ])),
                ..Default::default()
            }),
            ..Default::default()
        };

        let event = raw_event(message);
        assert!(event.is_container());
        assert_eq!(event.action, "die");
        assert_eq!(event.actor_id, "abc123");
        assert_eq!(event.attribute("exitCode"), Some("1"));
    }

    #[test]
    fn non_container_kinds_are_preserved() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::NETWORK),
            action: Some("connect".to_string()),
            ..Default::default()
        };

        let event = raw_event(message);
        assert!(!event.is_container());
        assert_eq!(event.kind, "network");
        assert!(event.actor_id.is_empty());
    }
}
