//! # Devloop Docker Operations
//!
//! File: cli/src/common/docker/operations.rs
//!
//! ## Overview
//!
//! Image builds for `image` components. An apply command that targets an image
//! component ends up in `build_image`, which packs the build context, sends it
//! to the daemon and follows the build stream until it finishes or fails.
//!
//! Build output is routed like exec output: printed to the host, turned into
//! `logText` events, or only logged at debug level when it is not shown.
//!
use crate::common::archive::tar::create_context_tar;
use crate::common::ui::events::MachineEvent;
use crate::core::error::{DevloopError, Result};
use anyhow::{anyhow, Context};
use bollard::{image::BuildImageOptions, models::BuildInfo};
use futures_util::stream::StreamExt;
use std::io::{stdout, Write as IoWrite};
use std::path::Path;
use tracing::{debug, error, info, instrument};

use super::connect::connect_docker;
use super::interaction::OutputMode;

/// Builds a Docker image from a Dockerfile and a build context directory.
///
/// # Arguments
///
/// * `tag` - The name and tag for the image (e.g., "shop/app:dev").
/// * `dockerfile` - The path to the Dockerfile, relative to `context_dir`.
/// * `context_dir` - The directory sent to Docker as the build context.
/// * `excluded` - Top-level entries of `context_dir` to leave out of the context.
/// * `mode` - Where the build output goes.
///
/// # Errors
///
/// Returns an `Err` if the context cannot be packed, the daemon cannot be
/// reached, the build stream fails, or the daemon reports a build error.
#[instrument(skip(excluded, mode), fields(context = %context_dir.display()))]
pub async fn build_image(
    tag: &str,
    dockerfile: &str,
    context_dir: &Path,
    excluded: &[&str],
    mode: OutputMode,
) -> Result<()> {
    let docker = connect_docker().await?;

    info!(
        "Creating build context tarball for '{}'...",
        context_dir.display()
    );
    let tar_gz = create_context_tar(context_dir, excluded)
        .context("Failed to create build context tarball")?;

    let build_options = BuildImageOptions {
        dockerfile: dockerfile.to_string(),
        t: tag.to_string(),
        rm: true,
        ..Default::default()
    };

    info!("Starting image build for tag: {}", tag);
    let mut build_stream = docker.build_image(build_options, None, Some(tar_gz.into()));

    while let Some(build_result) = build_stream.next().await {
        match build_result {
            Ok(BuildInfo {
                error: Some(err),
                error_detail,
                ..
            }) => {
                let detail_msg = error_detail.and_then(|d| d.message).unwrap_or_default();
                error!("Build Error: {} - {}", err, detail_msg);
                return Err(anyhow!(DevloopError::Docker(format!(
                    "Build of '{}' failed: {}. {}",
                    tag, err, detail_msg
                ))));
            }
            Ok(BuildInfo {
                stream: Some(s), ..
            }) => match mode {
                OutputMode::Host => {
                    print!("{}", s);
                    let _ = stdout().flush();
                }
                OutputMode::Json => {
                    for line in s.lines().filter(|l| !l.trim().is_empty()) {
                        MachineEvent::log_text(line, "stdout").emit();
                    }
                }
                OutputMode::Capture => debug!("Build: {}", s.trim_end()),
            },
            Ok(BuildInfo {
                status: Some(s), ..
            }) => debug!("Build Status: {}", s),
            Ok(info) => debug!("Received unhandled build info: {:?}", info),
            Err(e) => {
                return Err(anyhow!(DevloopError::DockerApi { source: e }))
                    .context("Failed to process build stream event");
            }
        }
    }

    info!("Image build stream finished successfully for tag: {}", tag);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Requires a running Docker daemon with network access for `alpine`.
    #[tokio::test]
    #[ignore]
    async fn test_build_image_from_context() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("Dockerfile"), "FROM alpine\nRUN true\n").unwrap();
        build_image(
            "devloop-test-image:latest",
            "Dockerfile",
            temp_dir.path(),
            &[],
            OutputMode::Capture,
        )
        .await
        .unwrap();
    }
}
