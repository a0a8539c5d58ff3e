//! # Devloop Docker Container Interaction
//!
//! File: cli/src/common/docker/interaction.rs
//!
//! ## Overview
//!
//! Runs a command inside a component container (`exec_in_container`) and
//! routes its output according to an `OutputMode`:
//!
//! - **`Host`**: stdout/stderr chunks are written to the host's stdout/stderr as they arrive.
//! - **`Json`**: output is split into lines and each line is printed as a `logText` event.
//! - **`Capture`**: output is buffered and returned, so a failing command can
//!   report what it printed even when output was not shown.
//!
//! ## Architecture
//!
//! - The target container must already be running. Devloop never creates or
//!   starts component containers; a stopped container is an error.
//! - A Docker exec instance is created with stdout/stderr attached (stdin and a
//!   TTY on request). The multiplexed output stream is consumed in a tokio task
//!   while an optional stdin task copies host input to the exec.
//! - After both tasks finish, the exec is inspected for its exit code.
//!
//! ## Usage
//!
//! ```rust
//! let argv = vec!["/bin/sh".to_string(), "-c".to_string(), "npm test".to_string()];
//! let outcome = interaction::exec_in_container("shop-runtime", &argv, ExecOptions::shown(true), OutputMode::Host).await?;
//! println!("exit code {}", outcome.exit_code);
//! ```
//!
use crate::common::ui::events::MachineEvent;
use crate::common::ui::OutputFormat;
use crate::core::error::{DevloopError, Result};
use crate::devfile::executor::ExecOptions;
use anyhow::anyhow;
use bollard::{
    container::LogOutput,
    exec::{CreateExecOptions, StartExecResults},
};
use futures_util::StreamExt;
use std::io;
use tokio::{
    io::{copy, stderr, stdin, stdout, AsyncWriteExt},
    task,
};
use tracing::{debug, info, instrument, warn};

use super::connect::connect_docker;
use super::state::inspect_container;

/// Where the output of an exec goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Host,
    Json,
    Capture,
}

impl OutputMode {
    pub fn select(format: OutputFormat, show: bool) -> Self {
        match (show, format) {
            (false, _) => OutputMode::Capture,
            (true, OutputFormat::Human) => OutputMode::Host,
            (true, OutputFormat::Json) => OutputMode::Json,
        }
    }
}

/// Result of a finished exec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    /// Exit code reported by Docker, `-1` if unknown.
    pub exit_code: i64,
    /// Combined output, only filled in `Capture` mode.
    pub output: String,
}

/// Appends `chunk` to `pending` and returns every completed line.
pub(crate) fn take_lines(pending: &mut String, chunk: &str) -> Vec<String> {
    pending.push_str(chunk);
    let mut lines = Vec::new();
    while let Some(pos) = pending.find('\n') {
        let line: String = pending.drain(..=pos).collect();
        lines.push(line.trim_end_matches(['\n', '\r']).to_string());
    }
    lines
}

/// Per-stream routing state of one exec.
struct OutputRouter {
    mode: OutputMode,
    captured: String,
    pending_stdout: String,
    pending_stderr: String,
}

impl OutputRouter {
    fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            captured: String::new(),
            pending_stdout: String::new(),
            pending_stderr: String::new(),
        }
    }

    async fn route(&mut self, message: &[u8], is_stderr: bool) -> io::Result<()> {
        match self.mode {
            OutputMode::Host => {
                if is_stderr {
                    let mut host = stderr();
                    host.write_all(message).await?;
                    host.flush().await
                } else {
                    let mut host = stdout();
                    host.write_all(message).await?;
                    host.flush().await
                }
            }
            OutputMode::Json => {
                let text = String::from_utf8_lossy(message);
                let (pending, stream) = if is_stderr {
                    (&mut self.pending_stderr, "stderr")
                } else {
                    (&mut self.pending_stdout, "stdout")
                };
                for line in take_lines(pending, &text) {
                    MachineEvent::log_text(&line, stream).emit();
                }
                Ok(())
            }
            OutputMode::Capture => {
                self.captured.push_str(&String::from_utf8_lossy(message));
                Ok(())
            }
        }
    }

    /// Emits unterminated trailing lines and returns the captured text.
    fn finish(self) -> String {
        if self.mode == OutputMode::Json {
            for (rest, stream) in [
                (&self.pending_stdout, "stdout"),
                (&self.pending_stderr, "stderr"),
            ] {
                if !rest.is_empty() {
                    MachineEvent::log_text(rest, stream).emit();
                }
            }
        }
        self.captured
    }
}

/// Executes a command inside a running container and waits for it to finish.
///
/// # Arguments
///
/// * `name_or_id` - The name or ID of the target container.
/// * `cmd` - The command and its arguments.
/// * `options` - TTY and stdin handling.
/// * `mode` - Where the command's output goes.
///
/// # Returns
///
/// * `Result<ExecOutcome>` - The exit code and, in `Capture` mode, the output.
///
/// # Errors
///
/// * `DevloopError::ContainerNotFound` - If the container does not exist.
/// * `DevloopError::ContainerNotRunning` - If the container is stopped.
/// * `DevloopError::DockerApi` - For errors creating, starting or inspecting the exec.
#[instrument(skip(name_or_id, cmd, options, mode), fields(container = %name_or_id))]
pub async fn exec_in_container(
    name_or_id: &str,
    cmd: &[String],
    options: ExecOptions,
    mode: OutputMode,
) -> Result<ExecOutcome> {
    let docker = connect_docker().await?;

    let details = inspect_container(name_or_id).await?;
    let running = details
        .state
        .as_ref()
        .and_then(|s| s.running)
        .unwrap_or(false);
    if !running {
        warn!("Exec refused: container '{}' is not running.", name_or_id);
        return Err(anyhow!(DevloopError::ContainerNotRunning {
            name: name_or_id.to_string()
        }));
    }

    info!(
        "Creating exec instance in container '{}' for command: {:?} (Interactive: {}, TTY: {})",
        name_or_id, cmd, options.interactive, options.tty
    );

    let exec_options = CreateExecOptions {
        attach_stdout: Some(true),
        attach_stderr: Some(true),
        attach_stdin: Some(options.interactive),
        tty: Some(options.tty),
        cmd: Some(cmd.to_vec()),
        ..Default::default()
    };

    let exec_create_response = docker
        .create_exec(name_or_id, exec_options)
        .await
        .map_err(|e| match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => anyhow!(DevloopError::ContainerNotFound {
                name: name_or_id.to_string()
            }),
            _ => anyhow!(DevloopError::DockerApi { source: e }).context(format!(
                "Failed to create exec instance in container '{}'",
                name_or_id
            )),
        })?;
    let exec_id = exec_create_response.id;
    debug!("Created exec instance ID: {}", exec_id);

    let start_exec_result = docker.start_exec(&exec_id, None).await.map_err(|e| {
        anyhow!(DevloopError::DockerApi { source: e }).context("Failed to start exec instance")
    })?;

    let output = match start_exec_result {
        StartExecResults::Attached {
            mut output,
            mut input,
        } => {
            let stdin_handle = if options.interactive {
                task::spawn(async move {
                    let mut host_stdin = stdin();
                    match copy(&mut host_stdin, &mut input).await {
                        Ok(n) => debug!("Exec stdin stream finished after {} bytes.", n),
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                            debug!("Exec stdin broken pipe.")
                        }
                        Err(e) => warn!("Error writing stdin to exec: {}", e),
                    }
                    if let Err(e) = input.shutdown().await {
                        debug!("Error shutting down exec stdin writer: {}", e);
                    }
                })
            } else {
                task::spawn(async {})
            };

            let output_handle = task::spawn(async move {
                let mut router = OutputRouter::new(mode);
                while let Some(result) = output.next().await {
                    let routed = match result {
                        Ok(LogOutput::StdOut { message }) | Ok(LogOutput::Console { message }) => {
                            router.route(&message, false).await
                        }
                        Ok(LogOutput::StdErr { message }) => router.route(&message, true).await,
                        Ok(LogOutput::StdIn { .. }) => Ok(()),
                        Err(e) => {
                            warn!("Error receiving output from exec stream: {}", e);
                            break;
                        }
                    };
                    if let Err(e) = routed {
                        warn!("Error forwarding exec output: {}", e);
                        break;
                    }
                }
                router.finish()
            });

            let (stdin_res, output_res) = tokio::join!(stdin_handle, output_handle);
            if let Err(e) = stdin_res {
                warn!("Stdin handling task failed for exec '{}': {}", exec_id, e);
            }
            output_res.unwrap_or_else(|e| {
                warn!("Output handling task failed for exec '{}': {}", exec_id, e);
                String::new()
            })
        }
        StartExecResults::Detached => String::new(),
    };

    let inspect_response = docker.inspect_exec(&exec_id).await.map_err(|e| {
        anyhow!(DevloopError::DockerApi { source: e }).context(format!(
            "Failed to inspect exec instance '{}' after execution",
            exec_id
        ))
    })?;
    let exit_code = inspect_response.exit_code.unwrap_or(-1);
    info!(
        "Exec instance '{}' finished with exit code: {}",
        exec_id, exit_code
    );

    Ok(ExecOutcome { exit_code, output })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_lines_buffers_partial_lines() {
        let mut pending = String::new();
        assert!(take_lines(&mut pending, "hel").is_empty());
        assert_eq!(take_lines(&mut pending, "lo\r\nwor"), vec!["hello"]);
        assert_eq!(take_lines(&mut pending, "ld\n\n"), vec!["world", ""]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_output_mode_selection() {
        assert_eq!(OutputMode::select(OutputFormat::Human, true), OutputMode::Host);
        assert_eq!(OutputMode::select(OutputFormat::Json, true), OutputMode::Json);
        assert_eq!(OutputMode::select(OutputFormat::Json, false), OutputMode::Capture);
    }

    #[tokio::test]
    async fn test_capture_mode_collects_both_streams() {
        let mut router = OutputRouter::new(OutputMode::Capture);
        router.route(b"out\n", false).await.unwrap();
        router.route(b"err\n", true).await.unwrap();
        assert_eq!(router.finish(), "out\nerr\n");
    }

    /// Requires a running Docker daemon and a container named `devloop-it`.
    #[tokio::test]
    #[ignore]
    async fn test_exec_in_running_container() {
        let argv = vec!["/bin/sh".to_string(), "-c".to_string(), "echo hi".to_string()];
        let outcome = exec_in_container("devloop-it", &argv, ExecOptions::default(), OutputMode::Capture)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.output.trim(), "hi");
    }
}
