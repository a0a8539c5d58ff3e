//! # Devloop Docker Connection Helper
//!
//! File: cli/src/common/docker/connect.rs
//!
//! ## Overview
//!
//! A single function, `connect_docker`, that connects to the local Docker
//! daemon with `bollard`'s defaults (`DOCKER_HOST`, otherwise the platform
//! socket) and maps failures to `DevloopError::DockerApi`.
//!
//! ```rust
//! use super::connect::connect_docker;
//!
//! let docker = connect_docker().await?;
//! ```
//!
use crate::core::error::{DevloopError, Result};
use anyhow::{anyhow, Context};
use bollard::Docker;
use tracing::instrument;

/// Establishes a connection to the local Docker daemon using default settings.
///
/// # Errors
///
/// Returns an `Err` wrapping `DevloopError::DockerApi` if the connection fails,
/// with context suggesting the daemon may not be running.
#[instrument]
pub async fn connect_docker() -> Result<Docker> {
    Docker::connect_with_local_defaults()
        .map_err(|e| anyhow!(DevloopError::DockerApi { source: e }))
        .context("Failed to connect to Docker daemon. Is it running and accessible?")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Requires a running Docker daemon. Run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_connect_docker_success() {
        let result = connect_docker().await;
        assert!(
            result.is_ok(),
            "Should connect successfully if Docker is running"
        );
    }
}
