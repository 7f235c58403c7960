//! Container runtime seam and its Docker implementation.
//!
//! The reconciler only needs three things from the runtime: which containers
//! are running right now, the labels of one container, and a live feed of
//! lifecycle events. Docker delivers events and stream errors over one
//! connection, so they arrive here as a single ordered stream of
//! `Result<ContainerEvent>` and are consumed in arrival order.

use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::models::EventMessage;
use bollard::system::EventsOptions;
use bollard::Docker;
use futures_util::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use syncdns_core::{ContainerEvent, ContainerId, Result, RunningContainer, SyncError};
use tracing::{debug, warn};

/// What the reconciler needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Containers currently running, with their labels
    async fn running_containers(&self) -> Result<Vec<RunningContainer>>;

    /// Labels of a single container
    async fn container_labels(&self, id: &ContainerId) -> Result<HashMap<String, String>>;

    /// Live container lifecycle events, interleaved with stream errors
    fn events(&self) -> BoxStream<'_, Result<ContainerEvent>>;
}

/// [`ContainerRuntime`] backed by the Docker Engine API.
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect using `DOCKER_HOST` or the platform's local socket.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| SyncError::Runtime(format!("failed to connect to docker: {e}")))?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn running_containers(&self) -> Result<Vec<RunningContainer>> {
        let summaries = self
            .docker
            .list_containers(Some(ListContainersOptions::<String>::default()))
            .await
            .map_err(|e| SyncError::Runtime(format!("failed to list containers: {e}")))?;

        Ok(summaries
            .into_iter()
            .filter_map(|summary| {
                let Some(id) = summary.id else {
                    warn!(names = ?summary.names, "running container reported without an id, skipping");
                    return None;
                };
                Some(RunningContainer {
                    id: ContainerId::new(id),
                    labels: summary.labels.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn container_labels(&self, id: &ContainerId) -> Result<HashMap<String, String>> {
        let inspect = self
            .docker
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(|e| SyncError::Runtime(format!("failed to inspect container {id}: {e}")))?;

        Ok(inspect
            .config
            .and_then(|config| config.labels)
            .unwrap_or_default())
    }

    fn events(&self) -> BoxStream<'_, Result<ContainerEvent>> {
        let mut filters = HashMap::new();
        filters.insert(String::from("type"), vec![String::from("container")]);

        let options = EventsOptions::<String> {
            filters,
            ..Default::default()
        };

        self.docker
            .events(Some(options))
            .filter_map(|item| async move {
                match item {
                    Ok(message) => event_from_message(message).map(Ok),
                    Err(e) => Some(Err(SyncError::Runtime(format!(
                        "error receiving docker events: {e}"
                    )))),
                }
            })
            .boxed()
    }
}

/// Convert a Docker event into a [`ContainerEvent`].
///
/// Messages without an actor id or an action carry nothing to act on.
fn event_from_message(message: EventMessage) -> Option<ContainerEvent> {
    let id = message.actor.and_then(|actor| actor.id);
    match (id, message.action) {
        (Some(id), Some(action)) => Some(ContainerEvent::new(id, action)),
        (id, action) => {
            debug!(?id, ?action, "ignoring incomplete docker event");
            None
        }
    }
}
