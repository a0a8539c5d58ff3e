//! # Devloop Docker Container State
//!
//! File: cli/src/common/docker/state.rs
//!
//! ## Overview
//!
//! Read-only queries about component containers:
//!
//! - **`inspect_container`**: full inspection, with 404 mapped to `ContainerNotFound`.
//! - **`container_running`**: `true` only for an existing container in the running state.
//! - **`running_container_id`**: the id of a container that must be running. The
//!   push cycle compares it with the id recorded at the last push.
//!
//! Devloop never creates component containers; these functions only look.
//!
use crate::core::error::{DevloopError, Result};
use anyhow::anyhow;
use bollard::{
    container::InspectContainerOptions,
    models::{ContainerInspectResponse, ContainerStateStatusEnum},
};
use tracing::{debug, error, instrument, warn};

use super::connect::connect_docker;

/// Inspects a container by name or ID.
///
/// # Errors
///
/// * `DevloopError::ContainerNotFound` - If the container doesn't exist (maps Docker 404).
/// * `DevloopError::DockerApi` - For other errors during communication with the Docker daemon.
#[instrument(skip(name_or_id), fields(container = %name_or_id))]
pub async fn inspect_container(name_or_id: &str) -> Result<ContainerInspectResponse> {
    let docker = connect_docker().await?;
    debug!("Inspecting container: {}", name_or_id);

    docker
        .inspect_container(name_or_id, None::<InspectContainerOptions>)
        .await
        .map_err(|e| match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => {
                warn!(
                    "Inspection failed because container '{}' was not found.",
                    name_or_id
                );
                anyhow!(DevloopError::ContainerNotFound {
                    name: name_or_id.to_string()
                })
            }
            _ => {
                error!("Failed to inspect container '{}': {:?}", name_or_id, e);
                anyhow!(DevloopError::DockerApi { source: e })
                    .context(format!("Failed to inspect container '{}'", name_or_id))
            }
        })
}

fn is_running(details: &ContainerInspectResponse) -> bool {
    details
        .state
        .as_ref()
        .is_some_and(|s| s.status == Some(ContainerStateStatusEnum::RUNNING))
}

/// Checks if a container is currently in the 'running' state.
///
/// A missing container is reported as `Ok(false)`, not as an error.
#[instrument(skip(name_or_id), fields(container = %name_or_id))]
pub async fn container_running(name_or_id: &str) -> Result<bool> {
    match inspect_container(name_or_id).await {
        Ok(details) => {
            let running = is_running(&details);
            debug!("Container '{}' running status: {}", name_or_id, running);
            Ok(running)
        }
        Err(e)
            if e.downcast_ref::<DevloopError>()
                .is_some_and(|err| matches!(err, DevloopError::ContainerNotFound { .. })) =>
        {
            debug!("Container '{}' not found, thus not running.", name_or_id);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Returns the id of a running container.
///
/// # Errors
///
/// * `DevloopError::ContainerNotFound` - The container does not exist.
/// * `DevloopError::ContainerNotRunning` - The container exists but is stopped.
#[instrument(skip(name_or_id), fields(container = %name_or_id))]
pub async fn running_container_id(name_or_id: &str) -> Result<String> {
    let details = inspect_container(name_or_id).await?;
    if !is_running(&details) {
        return Err(anyhow!(DevloopError::ContainerNotRunning {
            name: name_or_id.to_string()
        }));
    }
    details.id.ok_or_else(|| {
        anyhow!(DevloopError::DockerOperation(format!(
            "Docker returned no id for container '{}'",
            name_or_id
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::ContainerState;

    #[test]
    fn test_is_running() {
        let running = ContainerInspectResponse {
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::RUNNING),
                ..Default::default()
            }),
            ..Default::default()
        };
        let exited = ContainerInspectResponse {
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::EXITED),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(is_running(&running));
        assert!(!is_running(&exited));
        assert!(!is_running(&ContainerInspectResponse::default()));
    }

    /// Requires a running Docker daemon.
    #[tokio::test]
    #[ignore]
    async fn test_missing_container_is_not_running() {
        let running = container_running("devloop-test-no-such-container")
            .await
            .unwrap();
        assert!(!running);
    }
}
