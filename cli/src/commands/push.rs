//! # Devloop Push Command
//!
//! File: cli/src/commands/push.rs
//!
//! ## Overview
//!
//! `devloop push` runs the inner-loop cycle against the component container
//! that hosts the Run (or Debug) command:
//!
//! 1. Load configuration and devfile, validate every command.
//! 2. Resolve Init, Build and Run (and Debug with `--debug`). All resolution
//!    errors are reported together and nothing runs.
//! 3. Look up the target container. It must be running.
//! 4. Compare its id with the push state to tell a first push from an update,
//!    and a run/debug switch or a new Run/Debug command from a plain update.
//! 5. First push only: run the `postStart` events.
//! 6. Run Init (first push only), Build and the supervisor steps. The push
//!    state is recorded as soon as the supervisor is up.
//! 7. Record the new push state.
//!
//! ```bash
//! devloop push
//! devloop push --debug
//! devloop push --build-command build-fast --show-log
//! devloop push --force-restart
//! ```
//!
use crate::commands::{project::Project, GlobalOptions};
use crate::common::docker;
use crate::common::ui::Output;
use crate::core::error::Result;
use crate::core::state::{self, PushState};
use crate::devfile::executor::CommandExecutor;
use crate::devfile::lifecycle::{exec_devfile, exec_devfile_events, PushParameters};
use crate::devfile::model::CommandGroupKind;
use crate::devfile::resolve::{resolve_debug_command, resolve_push_commands};
use crate::devfile::runnable::shell_line;
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    about = "Build and (re)start the application in its component container",
    long_about = "Runs the devfile's Init (first push only), Build and Run commands in the running \
                  component container. With --debug, the Debug command is started instead of Run."
)]
pub struct PushArgs {
    /// Init command to use instead of the group default.
    #[arg(long)]
    init_command: Option<String>,

    /// Build command to use instead of the group default.
    #[arg(long)]
    build_command: Option<String>,

    /// Run command to use instead of the group default.
    #[arg(long)]
    run_command: Option<String>,

    /// Start the Debug command instead of the Run command.
    #[arg(long)]
    debug: bool,

    /// Debug command to use instead of the group default. Only used with --debug.
    #[arg(long)]
    debug_command: Option<String>,

    /// Stop and start the program even if it is hot-reload capable.
    #[arg(long)]
    force_restart: bool,

    /// Show the output of the executed commands.
    #[arg(long)]
    show_log: bool,
}

pub async fn handle_push(args: PushArgs, globals: &GlobalOptions) -> Result<()> {
    info!("Handling push command...");
    debug!("Push args: {:?}", args);
    let project = Project::load(globals)?;
    let output = Output::new(globals.output);

    project.validate_commands()?;

    let mut commands = resolve_push_commands(
        &project.devfile,
        args.init_command.as_deref(),
        args.build_command.as_deref(),
        args.run_command.as_deref(),
    )?;
    let main_kind = if args.debug {
        let debug_command =
            resolve_debug_command(&project.devfile, args.debug_command.as_deref())?;
        commands.insert(CommandGroupKind::Debug, debug_command);
        CommandGroupKind::Debug
    } else {
        CommandGroupKind::Run
    };
    let main_command = commands
        .get(&main_kind)
        .cloned()
        .context("Resolved push commands have no main command")?;

    let executor = project.executor(globals.output);
    let target = executor.resolve_supervisor_component_info(&main_command)?;
    let container_id = docker::running_container_id(&target.container_name)
        .await
        .with_context(|| {
            format!(
                "Component '{}' has no running container",
                target.component_name
            )
        })?;

    let current = PushState {
        container_id,
        debug: args.debug,
        command_line: main_command.as_exec().map(shell_line).unwrap_or_default(),
    };
    let previous = state::load_state(&project.state_dir)?;
    let history = state::push_history(previous.as_ref(), &current, args.force_restart);
    info!(
        "Pushing to '{}' (existing: {}, mode changed: {})",
        target.container_name, history.component_exists, history.run_mode_changed
    );

    let dyn_executor: Arc<dyn CommandExecutor> = executor;
    if !history.component_exists {
        let post_start = &project.devfile.events().post_start;
        if !post_start.is_empty() {
            output.status("Running postStart events");
            exec_devfile_events(
                &project.devfile,
                post_start,
                args.show_log,
                Arc::clone(&dyn_executor),
            )
            .await?;
        }
    }

    let params = PushParameters {
        component_exists: history.component_exists,
        run_mode_changed: history.run_mode_changed,
        debug: args.debug,
        show: args.show_log,
    };
    exec_devfile(
        &project.devfile,
        &commands,
        &params,
        &project.config.supervisor,
        dyn_executor,
        || state::save_state(&project.state_dir, &current),
    )
    .await?;

    state::save_state(&project.state_dir, &current)?;
    output.success(&format!(
        "Pushed {} to container {} ({} command \"{}\")",
        project.name, target.container_name, main_kind, main_command.id
    ));
    Ok(())
}
