//! # Command Executor Boundary
//!
//! File: cli/src/devfile/executor.rs
//!
//! ## Overview
//!
//! The engine never talks to Docker (or anything else) directly. Everything that
//! touches a target container goes through the `CommandExecutor` trait:
//!
//! - running an argv inside a component's container,
//! - mapping a devfile command to the container it targets,
//! - applying non-container components (image builds, manifests),
//! - reporting begin/complete events for observability.
//!
//! The production implementation is `common::docker::executor::DockerExecutor`.
//! Tests use the recording executor in `devfile::testing`.
//!
use crate::core::error::Result;
use crate::devfile::model::{Command, CommandGroupKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Identity of the process target for a command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComponentInfo {
    /// Devfile component name.
    pub component_name: String,
    /// Name of the container that backs the component.
    pub container_name: String,
}

/// Stream handling for one `exec_in_target` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOptions {
    /// Forward the command's output to the user.
    pub show: bool,
    /// Allocate a pseudo-terminal.
    pub tty: bool,
    /// Attach host stdin.
    pub interactive: bool,
}

impl ExecOptions {
    pub fn shown(show: bool) -> Self {
        Self {
            show,
            ..Default::default()
        }
    }
}

/// Payload of the begin/complete events reported around an exec command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEvent {
    pub command_id: String,
    pub component: String,
    pub command_line: String,
    pub group: Option<CommandGroupKind>,
    pub timestamp: String,
}

impl ExecutionEvent {
    pub fn new(
        command_id: &str,
        component: &str,
        command_line: &str,
        group: Option<CommandGroupKind>,
    ) -> Self {
        Self {
            command_id: command_id.to_string(),
            component: component.to_string(),
            command_line: command_line.to_string(),
            group,
            timestamp: timestamp_now(),
        }
    }
}

/// Formats a timestamp as `<unix-seconds>.<microseconds>`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
}

pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Everything the execution engine needs from the outside world.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `argv` inside the target container and waits for it to finish.
    /// A non-zero exit status is an error.
    async fn exec_in_target(
        &self,
        target: &ComponentInfo,
        argv: &[String],
        options: ExecOptions,
    ) -> Result<()>;

    /// Maps a command to the container it runs in.
    fn resolve_component_info(&self, command: &Command) -> Result<ComponentInfo>;

    /// Maps a Run/Debug command to the container whose supervisor manages it.
    fn resolve_supervisor_component_info(&self, command: &Command) -> Result<ComponentInfo>;

    /// Applies a non-container component by name.
    async fn apply_component(&self, component: &str) -> Result<()>;

    fn report_execution_begin(&self, event: &ExecutionEvent);

    fn report_execution_complete(&self, event: &ExecutionEvent, error: Option<&anyhow::Error>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let at = Utc.timestamp_opt(1_700_000_000, 42_000).unwrap();
        assert_eq!(format_timestamp(at), "1700000000.000042");
    }
}
