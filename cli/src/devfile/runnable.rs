//! # Runnable Command Tree
//!
//! File: cli/src/devfile/runnable.rs
//!
//! ## Overview
//!
//! A `Runnable` is the executable counterpart of a resolved devfile command.
//! `build` turns a `Command` into a tree of runnables, resolving every target
//! container up front, and `Runnable::execute` runs the tree.
//!
//! ## Architecture
//!
//! The variants form a closed enum:
//!
//! - **`Exec`**: one `sh -c` invocation in a component container.
//! - **`Composite`**: children in declaration order, stopping at the first failure.
//! - **`ParallelComposite`**: one tokio task per child. Every child runs to
//!   completion and all failures are reported together.
//! - **`Apply`**: hands a non-container component to the executor.
//! - **`Supervisor`**: a fixed supervisor control argv, synthesized by the push
//!   lifecycle rather than read from the devfile. This includes writing the
//!   program script the supervisor launches.
//!
//! Runnables hold an `Arc<dyn CommandExecutor>` and own copies of everything
//! they need, so a tree can be cloned into spawned tasks and is independent of
//! the `Devfile` it was built from. A tree is built per invocation and dropped
//! after it runs.
//!
use crate::core::config::SupervisorConfig;
use crate::core::error::{CommandError, DevloopError, Result};
use crate::devfile::executor::{
    timestamp_now, CommandExecutor, ComponentInfo, ExecOptions, ExecutionEvent,
};
use crate::devfile::model::{
    normalize_id, Command, CommandGroupKind, CommandKind, CommandMap, ExecCommand,
};
use anyhow::{anyhow, Context};
use futures_util::future::{join_all, BoxFuture};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Shell every exec command runs through.
pub const SHELL_EXECUTABLE: &str = "/bin/sh";

/// Builds the effective `sh -c` argv for an exec command.
pub fn shell_argv(exec: &ExecCommand) -> Vec<String> {
    vec![SHELL_EXECUTABLE.to_string(), "-c".to_string(), shell_line(exec)]
}

/// The shell line an exec command runs as.
///
/// Environment variables become an `export NAME="value" ... &&` prefix and a
/// working directory becomes a leading `cd <dir> &&`. The variables are
/// exported rather than assigned so child processes of the command see them.
pub fn shell_line(exec: &ExecCommand) -> String {
    let mut line = exec.command_line.clone();
    if !exec.env.is_empty() {
        let assignments: Vec<String> = exec
            .env
            .iter()
            .map(|v| format!("{}=\"{}\"", v.name, v.value))
            .collect();
        line = format!("export {} && {}", assignments.join(" "), line);
    }
    if let Some(dir) = exec.working_dir.as_deref().filter(|d| !d.is_empty()) {
        line = format!("cd {} && {}", dir, line);
    }
    line
}

/// Single-quotes `value` for a POSIX shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// A supervisor control operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorAction {
    /// Launch the supervisor daemon.
    Init,
    /// Stop every program the supervisor manages.
    StopAll,
    /// Replace the script of `program` with `line`.
    WriteScript { program: String, line: String },
    /// Start (or keep running) one program.
    Start(String),
}

impl SupervisorAction {
    pub fn argv(&self, config: &SupervisorConfig) -> Vec<String> {
        let bin = config.binary.clone();
        match self {
            SupervisorAction::Init => vec![bin, "-c".into(), config.conf_path.clone(), "-d".into()],
            SupervisorAction::StopAll => vec![bin, "ctl".into(), "stop".into(), "all".into()],
            SupervisorAction::WriteScript { program, line } => {
                let script = config.script_path(program);
                vec![
                    SHELL_EXECUTABLE.to_string(),
                    "-c".to_string(),
                    format!(
                        "mkdir -p {} && printf '%s\\n' {} > {}",
                        shell_quote(&config.script_dir),
                        shell_quote(line),
                        shell_quote(&script)
                    ),
                ]
            }
            SupervisorAction::Start(program) => {
                vec![bin, "ctl".into(), "start".into(), program.clone()]
            }
        }
    }
}

impl fmt::Display for SupervisorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorAction::Init => f.write_str("init"),
            SupervisorAction::StopAll => f.write_str("stop all"),
            SupervisorAction::WriteScript { program, .. } => write!(f, "write {} script", program),
            SupervisorAction::Start(program) => write!(f, "start {}", program),
        }
    }
}

#[derive(Clone)]
pub struct ExecRunnable {
    pub id: String,
    pub group: Option<CommandGroupKind>,
    pub target: ComponentInfo,
    pub command_line: String,
    pub argv: Vec<String>,
    executor: Arc<dyn CommandExecutor>,
}

#[derive(Debug, Clone)]
pub struct CompositeRunnable {
    pub id: String,
    pub children: Vec<Runnable>,
}

#[derive(Clone)]
pub struct ApplyRunnable {
    pub id: String,
    pub component: String,
    executor: Arc<dyn CommandExecutor>,
}

#[derive(Clone)]
pub struct SupervisorRunnable {
    pub action: SupervisorAction,
    pub target: ComponentInfo,
    pub argv: Vec<String>,
    /// The Run/Debug command the supervisor acts on behalf of.
    pub command_id: String,
    pub command_line: String,
    pub group: Option<CommandGroupKind>,
    executor: Arc<dyn CommandExecutor>,
}

impl fmt::Debug for ExecRunnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecRunnable")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("target", &self.target)
            .field("argv", &self.argv)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ApplyRunnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyRunnable")
            .field("id", &self.id)
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for SupervisorRunnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisorRunnable")
            .field("action", &self.action)
            .field("target", &self.target)
            .field("argv", &self.argv)
            .finish_non_exhaustive()
    }
}

/// Executable command tree.
#[derive(Debug, Clone)]
pub enum Runnable {
    Exec(ExecRunnable),
    Composite(CompositeRunnable),
    ParallelComposite(CompositeRunnable),
    Apply(ApplyRunnable),
    Supervisor(SupervisorRunnable),
}

/// Builds the runnable tree for `command`.
///
/// Composite references are looked up in `all_commands`. Target containers are
/// resolved here, so an unknown component fails the build rather than the run.
/// A reference cycle is reported as an error even if the devfile was never
/// validated.
///
/// # Errors
///
/// Returns an error if a reference is missing or cyclic, or if the executor
/// cannot resolve a command's component.
pub fn build(
    command: &Command,
    all_commands: &CommandMap<'_>,
    executor: Arc<dyn CommandExecutor>,
) -> Result<Runnable> {
    let mut path = Vec::new();
    build_on_path(command, None, all_commands, &executor, &mut path)
}

fn build_on_path(
    command: &Command,
    inherited_group: Option<CommandGroupKind>,
    all_commands: &CommandMap<'_>,
    executor: &Arc<dyn CommandExecutor>,
    path: &mut Vec<String>,
) -> Result<Runnable> {
    let id = normalize_id(&command.id);
    let group = command.group_kind().or(inherited_group);

    match &command.kind {
        CommandKind::Exec(exec) => {
            let target = executor
                .resolve_component_info(command)
                .with_context(|| format!("Failed to resolve the component of command \"{}\"", id))?;
            debug!("Built exec runnable '{}' for container '{}'", id, target.container_name);
            Ok(Runnable::Exec(ExecRunnable {
                id,
                group,
                target,
                command_line: exec.command_line.clone(),
                argv: shell_argv(exec),
                executor: Arc::clone(executor),
            }))
        }
        CommandKind::Apply(apply) => Ok(Runnable::Apply(ApplyRunnable {
            id,
            component: apply.component.clone(),
            executor: Arc::clone(executor),
        })),
        CommandKind::Composite(composite) => {
            if let Some(parent) = path.last().filter(|_| path.contains(&id)) {
                return Err(CommandError::IndirectReference { id: parent.clone() }.into());
            }
            path.push(id.clone());

            let mut children = Vec::with_capacity(composite.commands.len());
            for reference in &composite.commands {
                let reference = normalize_id(reference);
                if reference == id {
                    return Err(CommandError::SelfReference { id }.into());
                }
                let child = all_commands.get(&reference).ok_or_else(|| {
                    CommandError::MissingSubCommand {
                        parent: id.clone(),
                        child: reference.clone(),
                    }
                })?;
                children.push(build_on_path(child, group, all_commands, executor, path)?);
            }
            path.pop();

            let composite_runnable = CompositeRunnable { id, children };
            if composite.parallel {
                Ok(Runnable::ParallelComposite(composite_runnable))
            } else {
                Ok(Runnable::Composite(composite_runnable))
            }
        }
    }
}

impl Runnable {
    /// A supervisor control step acting for the Run/Debug `command`.
    pub fn supervisor(
        action: SupervisorAction,
        config: &SupervisorConfig,
        command: &Command,
        executor: Arc<dyn CommandExecutor>,
    ) -> Result<Runnable> {
        let target = executor
            .resolve_supervisor_component_info(command)
            .with_context(|| {
                format!(
                    "Failed to resolve the supervisor component of command \"{}\"",
                    command.id
                )
            })?;
        Ok(Runnable::Supervisor(SupervisorRunnable {
            argv: action.argv(config),
            action,
            target,
            command_id: normalize_id(&command.id),
            command_line: command
                .as_exec()
                .map(|e| e.command_line.clone())
                .unwrap_or_default(),
            group: command.group_kind(),
            executor,
        }))
    }

    /// Sequential composite of already-built runnables.
    pub fn sequence(id: impl Into<String>, children: Vec<Runnable>) -> Runnable {
        Runnable::Composite(CompositeRunnable {
            id: id.into(),
            children,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Runnable::Exec(r) => &r.id,
            Runnable::Composite(r) | Runnable::ParallelComposite(r) => &r.id,
            Runnable::Apply(r) => &r.id,
            Runnable::Supervisor(r) => &r.command_id,
        }
    }

    /// Runs the tree. `show` forwards command output to the user.
    pub fn execute(&self, show: bool) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            match self {
                Runnable::Exec(r) => r.execute(show).await,
                Runnable::Composite(r) => r.execute_sequential(show).await,
                Runnable::ParallelComposite(r) => r.execute_parallel(show).await,
                Runnable::Apply(r) => r.execute().await,
                Runnable::Supervisor(r) => r.execute(show).await,
            }
        })
    }
}

impl ExecRunnable {
    #[instrument(skip_all, fields(command = %self.id, container = %self.target.container_name))]
    async fn execute(&self, show: bool) -> Result<()> {
        let event = ExecutionEvent::new(
            &self.id,
            &self.target.component_name,
            &self.command_line,
            self.group,
        );
        self.executor.report_execution_begin(&event);
        info!("Executing command '{}': {}", self.id, self.command_line);

        let result = self
            .executor
            .exec_in_target(&self.target, &self.argv, ExecOptions::shown(show))
            .await
            .with_context(|| DevloopError::CommandExecution {
                id: self.id.clone(),
                component: self.target.component_name.clone(),
                command_line: self.command_line.clone(),
            });

        let completed = ExecutionEvent {
            timestamp: timestamp_now(),
            ..event
        };
        self.executor
            .report_execution_complete(&completed, result.as_ref().err());
        result
    }
}

impl CompositeRunnable {
    async fn execute_sequential(&self, show: bool) -> Result<()> {
        for child in &self.children {
            child.execute(show).await.with_context(|| {
                format!(
                    "composite command \"{}\" failed at \"{}\"",
                    self.id,
                    child.id()
                )
            })?;
        }
        Ok(())
    }

    async fn execute_parallel(&self, show: bool) -> Result<()> {
        debug!(
            "Running {} children of '{}' in parallel",
            self.children.len(),
            self.id
        );
        let handles: Vec<_> = self
            .children
            .iter()
            .cloned()
            .map(|child| {
                tokio::spawn(async move {
                    let result = child.execute(show).await;
                    (child.id().to_string(), result)
                })
            })
            .collect();

        let mut failures = Vec::new();
        for joined in join_all(handles).await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((child_id, Err(e))) => {
                    warn!("Parallel child '{}' of '{}' failed: {:#}", child_id, self.id, e);
                    failures.push(format!("\"{}\": {:#}", child_id, e));
                }
                Err(join_error) => {
                    failures.push(format!("a child task did not complete: {}", join_error));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!(DevloopError::ParallelExecution {
                id: self.id.clone(),
                failures,
            }))
        }
    }
}

impl ApplyRunnable {
    async fn execute(&self) -> Result<()> {
        info!("Applying component '{}' for command '{}'", self.component, self.id);
        self.executor.apply_component(&self.component).await
    }
}

impl SupervisorRunnable {
    #[instrument(skip_all, fields(action = %self.action, container = %self.target.container_name))]
    async fn execute(&self, show: bool) -> Result<()> {
        // Only starting a program stands for the devfile command itself.
        let event = matches!(self.action, SupervisorAction::Start(_)).then(|| {
            ExecutionEvent::new(
                &self.command_id,
                &self.target.component_name,
                &self.command_line,
                self.group,
            )
        });
        if let Some(event) = &event {
            self.executor.report_execution_begin(event);
        }

        let result = self
            .executor
            .exec_in_target(&self.target, &self.argv, ExecOptions::shown(show))
            .await
            .with_context(|| {
                format!(
                    "supervisor {} failed in component \"{}\"",
                    self.action, self.target.component_name
                )
            });

        if let Some(event) = event {
            let completed = ExecutionEvent {
                timestamp: timestamp_now(),
                ..event
            };
            self.executor
                .report_execution_complete(&completed, result.as_ref().err());
        }
        result
    }
}
