//! Recording `CommandExecutor` for engine tests.
//!
//! Every call is appended to an in-memory log in the order it happened. Exec
//! calls whose joined argv contains one of the configured patterns fail, as do
//! apply calls for configured component names.

use crate::core::error::{DevloopError, Result};
use crate::devfile::executor::{CommandExecutor, ComponentInfo, ExecOptions, ExecutionEvent};
use crate::devfile::model::Command;
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exec { container: String, argv: Vec<String> },
    Apply(String),
    Begin(String),
    Complete { id: String, failed: bool },
}

#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    failing: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(patterns: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failing: patterns.iter().map(|p| p.to_string()).collect(),
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The shell line (last argv element) of every exec, in order.
    pub fn exec_lines(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Exec { argv, .. } => argv.last().cloned(),
                _ => None,
            })
            .collect()
    }

    fn should_fail(&self, text: &str) -> bool {
        self.failing.iter().any(|p| text.contains(p.as_str()))
    }
}

pub fn container_for(component: &str) -> String {
    format!("test-{}", component)
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn exec_in_target(
        &self,
        target: &ComponentInfo,
        argv: &[String],
        _options: ExecOptions,
    ) -> Result<()> {
        self.record(Call::Exec {
            container: target.container_name.clone(),
            argv: argv.to_vec(),
        });
        // Let sibling tasks interleave like real execs would.
        tokio::task::yield_now().await;
        let joined = argv.join(" ");
        if self.should_fail(&joined) {
            return Err(anyhow!(DevloopError::ExternalCommand {
                cmd: joined,
                status: "exit code 1".into(),
                output: String::new(),
            }));
        }
        Ok(())
    }

    fn resolve_component_info(&self, command: &Command) -> Result<ComponentInfo> {
        let exec = command
            .as_exec()
            .ok_or_else(|| anyhow!("command \"{}\" has no single component", command.id))?;
        Ok(ComponentInfo {
            component_name: exec.component.clone(),
            container_name: container_for(&exec.component),
        })
    }

    fn resolve_supervisor_component_info(&self, command: &Command) -> Result<ComponentInfo> {
        self.resolve_component_info(command)
    }

    async fn apply_component(&self, component: &str) -> Result<()> {
        self.record(Call::Apply(component.to_string()));
        if self.should_fail(component) {
            return Err(anyhow!(DevloopError::Apply {
                component: component.to_string(),
                reason: "rejected".into(),
            }));
        }
        Ok(())
    }

    fn report_execution_begin(&self, event: &ExecutionEvent) {
        self.record(Call::Begin(event.command_id.clone()));
    }

    fn report_execution_complete(&self, event: &ExecutionEvent, error: Option<&anyhow::Error>) {
        self.record(Call::Complete {
            id: event.command_id.clone(),
            failed: error.is_some(),
        });
    }
}
