//! # Devfile Push Lifecycle
//!
//! File: cli/src/devfile/lifecycle.rs
//!
//! ## Overview
//!
//! Drives one push cycle against a component container:
//!
//! 1. **Init** (first creation only): the resolved Init command, if any.
//! 2. **Build**: the resolved Build command, if any. A failure stops the cycle
//!    before the supervisor is touched.
//! 3. **Supervisor steps**:
//!    - first creation: start the supervisor daemon, then tell the caller it
//!      is up;
//!    - existing component: stop all programs, unless the Run command is
//!      hot-reload capable and the run/debug mode did not change;
//!    - always: write the effective Run (or Debug) command line into the
//!      program's script, then start the program.
//!
//! It also runs devfile events (`postStart`, `preStop`), single commands such as
//! Test, and the stop-all step used by `devloop stop`.
//!
//! ## Usage
//!
//! ```rust
//! let params = PushParameters { component_exists: false, run_mode_changed: false, debug: false, show: true };
//! exec_devfile(&devfile, &push_commands, &params, &config.supervisor, executor, || Ok(())).await?;
//! ```
//!
use crate::core::config::SupervisorConfig;
use crate::core::error::{CommandError, Result};
use crate::devfile::executor::CommandExecutor;
use crate::devfile::model::{Command, CommandGroupKind, Devfile};
use crate::devfile::resolve::PushCommandsMap;
use crate::devfile::runnable::{build, shell_line, Runnable, SupervisorAction};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Inputs of one push cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushParameters {
    /// The component container was already set up by a previous push.
    pub component_exists: bool,
    /// The previous push ran in the other mode (run vs debug), or a restart was forced.
    pub run_mode_changed: bool,
    /// Start the Debug program instead of the Run program.
    pub debug: bool,
    /// Forward command output to the user.
    pub show: bool,
}

/// Whether an existing component must stop its programs before starting again.
pub fn needs_restart(run_command: &Command, run_mode_changed: bool) -> bool {
    !run_command.is_hot_reload_capable() || run_mode_changed
}

/// Runs one push cycle.
///
/// `commands` must contain the Run command (or the Debug command when
/// `params.debug` is set) and may contain Init and Build. The main command
/// must be an exec command.
///
/// `on_supervisor_started` is called right after the supervisor daemon was
/// launched on a first creation, so the caller can record that the component
/// now exists even if a later step fails.
///
/// # Errors
///
/// Returns the first failure. Nothing after a failed step runs.
#[instrument(skip_all, fields(exists = params.component_exists, debug = params.debug))]
pub async fn exec_devfile<F>(
    devfile: &Devfile,
    commands: &PushCommandsMap,
    params: &PushParameters,
    supervisor: &SupervisorConfig,
    executor: Arc<dyn CommandExecutor>,
    on_supervisor_started: F,
) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let all_commands = devfile.commands_map();
    let main_kind = if params.debug {
        CommandGroupKind::Debug
    } else {
        CommandGroupKind::Run
    };
    let main_command = commands
        .get(&main_kind)
        .ok_or(CommandError::GroupNotFound { kind: main_kind })?;
    let program_line = main_command
        .as_exec()
        .map(shell_line)
        .ok_or_else(|| CommandError::NotExec {
            id: main_command.id.clone(),
        })?;
    let main_context = || {
        format!(
            "Failed to execute {} command \"{}\"",
            main_kind, main_command.id
        )
    };

    if !params.component_exists {
        if let Some(init) = commands.get(&CommandGroupKind::Init) {
            info!("Executing init command '{}'", init.id);
            build(init, &all_commands, Arc::clone(&executor))?
                .execute(params.show)
                .await
                .with_context(|| format!("Failed to execute init command \"{}\"", init.id))?;
        }
    }

    if let Some(build_command) = commands.get(&CommandGroupKind::Build) {
        info!("Executing build command '{}'", build_command.id);
        build(build_command, &all_commands, Arc::clone(&executor))?
            .execute(params.show)
            .await
            .with_context(|| {
                format!("Failed to execute build command \"{}\"", build_command.id)
            })?;
    }

    if !params.component_exists {
        Runnable::supervisor(
            SupervisorAction::Init,
            supervisor,
            main_command,
            Arc::clone(&executor),
        )?
        .execute(params.show)
        .await
        .with_context(main_context)?;
        on_supervisor_started()?;
    }

    let program = supervisor.program(params.debug).to_string();
    let mut steps = Vec::with_capacity(3);
    if params.component_exists {
        if needs_restart(main_command, params.run_mode_changed) {
            steps.push(SupervisorAction::StopAll);
        } else {
            debug!(
                "Command '{}' is hot-reload capable, not restarting it",
                main_command.id
            );
        }
    }
    steps.push(SupervisorAction::WriteScript {
        program: program.clone(),
        line: program_line,
    });
    steps.push(SupervisorAction::Start(program));

    let children = steps
        .into_iter()
        .map(|action| Runnable::supervisor(action, supervisor, main_command, Arc::clone(&executor)))
        .collect::<Result<Vec<_>>>()?;

    info!("Executing {} command '{}'", main_kind, main_command.id);
    Runnable::sequence(main_command.id.clone(), children)
        .execute(params.show)
        .await
        .with_context(main_context)
}

/// Runs the named event commands in order, stopping at the first failure.
#[instrument(skip(devfile, executor))]
pub async fn exec_devfile_events(
    devfile: &Devfile,
    event_commands: &[String],
    show: bool,
    executor: Arc<dyn CommandExecutor>,
) -> Result<()> {
    let all_commands = devfile.commands_map();
    for name in event_commands {
        let command = devfile
            .find_command(name)
            .ok_or_else(|| CommandError::CommandNotFound { name: name.clone() })?;
        info!("Executing event command '{}'", command.id);
        build(command, &all_commands, Arc::clone(&executor))?
            .execute(show)
            .await
            .with_context(|| format!("Failed to execute event command \"{}\"", command.id))?;
    }
    Ok(())
}

/// Stops every supervisor program in the component of `main_command`.
pub async fn stop_programs(
    main_command: &Command,
    supervisor: &SupervisorConfig,
    show: bool,
    executor: Arc<dyn CommandExecutor>,
) -> Result<()> {
    info!("Stopping supervisor programs for '{}'", main_command.id);
    Runnable::supervisor(SupervisorAction::StopAll, supervisor, main_command, executor)?
        .execute(show)
        .await
}

/// Runs a resolved command once, outside the supervisor (Test, or any command by id).
pub async fn exec_command(
    devfile: &Devfile,
    command: &Command,
    show: bool,
    executor: Arc<dyn CommandExecutor>,
) -> Result<()> {
    let all_commands = devfile.commands_map();
    build(command, &all_commands, executor)?
        .execute(show)
        .await
        .with_context(|| format!("Failed to execute command \"{}\"", command.id))
}
