//! # Devloop Stop Command
//!
//! File: cli/src/commands/stop.rs
//!
//! ## Overview
//!
//! `devloop stop` winds down what `push` started, without touching the
//! container itself:
//!
//! 1. Run the devfile's `preStop` events.
//! 2. If a push was recorded and its container is still running, stop every
//!    supervisor program in it.
//! 3. Forget the push state, so the next push is a first push again.
//!
//! ```bash
//! devloop stop
//! ```
//!
use crate::commands::{project::Project, GlobalOptions};
use crate::common::docker::state::container_running;
use crate::common::ui::Output;
use crate::core::error::{CommandError, Result};
use crate::core::state;
use crate::devfile::executor::CommandExecutor;
use crate::devfile::lifecycle::{exec_devfile_events, stop_programs};
use crate::devfile::model::CommandGroupKind;
use crate::devfile::resolve::{resolve, resolve_debug_command};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Run preStop events and stop the programs started by push")]
pub struct StopArgs {
    /// Show the output of the executed commands.
    #[arg(long)]
    show_log: bool,
}

pub async fn handle_stop(args: StopArgs, globals: &GlobalOptions) -> Result<()> {
    info!("Handling stop command...");
    let project = Project::load(globals)?;
    let output = Output::new(globals.output);
    project.validate_commands()?;

    let executor = project.executor(globals.output);
    let pre_stop = &project.devfile.events().pre_stop;
    if !pre_stop.is_empty() {
        output.status("Running preStop events");
        exec_devfile_events(&project.devfile, pre_stop, args.show_log, executor.clone()).await?;
    }

    let Some(previous) = state::load_state(&project.state_dir)? else {
        output.success("Nothing was pushed; no programs to stop");
        return Ok(());
    };

    let main_command = if previous.debug {
        resolve_debug_command(&project.devfile, None)?
    } else {
        resolve(&project.devfile, CommandGroupKind::Run, None)?.ok_or(
            CommandError::GroupNotFound {
                kind: CommandGroupKind::Run,
            },
        )?
    };
    let target = executor.resolve_supervisor_component_info(&main_command)?;

    if container_running(&target.container_name).await? {
        let dyn_executor: Arc<dyn CommandExecutor> = executor;
        stop_programs(
            &main_command,
            &project.config.supervisor,
            args.show_log,
            dyn_executor,
        )
        .await
        .with_context(|| format!("Failed to stop programs in '{}'", target.container_name))?;
    } else {
        info!(
            "Container '{}' is not running, nothing to stop",
            target.container_name
        );
    }

    state::clear_state(&project.state_dir)?;
    output.success(&format!("Stopped {}", project.name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_args_parsing() {
        assert!(!StopArgs::try_parse_from(["stop"]).unwrap().show_log);
        assert!(StopArgs::try_parse_from(["stop", "--show-log"]).unwrap().show_log);
    }
}
