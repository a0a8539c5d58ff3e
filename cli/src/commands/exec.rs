//! # Devloop Exec Command
//!
//! File: cli/src/commands/exec.rs
//!
//! ## Overview
//!
//! `devloop exec <command-id>` runs one devfile command by id, whatever its
//! group: an exec command in its container, a composite with all its
//! children, or an apply command. The supervisor is not involved.
//!
//! ```bash
//! devloop exec seed-db --show-log
//! devloop exec Build-All
//! ```
//!
//! Ids are case-insensitive.
//!
use crate::commands::{project::Project, GlobalOptions};
use crate::common::ui::Output;
use crate::core::error::{CommandError, Result};
use crate::devfile::lifecycle::exec_command;
use clap::Parser;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Run a devfile command by id")]
pub struct ExecArgs {
    /// Id of the devfile command to run.
    command_id: String,

    /// Show the output of the executed commands.
    #[arg(long)]
    show_log: bool,
}

pub async fn handle_exec(args: ExecArgs, globals: &GlobalOptions) -> Result<()> {
    info!("Handling exec command...");
    debug!("Exec args: {:?}", args);
    let project = Project::load(globals)?;
    project.validate_commands()?;

    let command = project
        .devfile
        .find_command(&args.command_id)
        .ok_or_else(|| CommandError::CommandNotFound {
            name: args.command_id.clone(),
        })?;
    exec_command(
        &project.devfile,
        command,
        args.show_log,
        project.executor(globals.output),
    )
    .await?;

    Output::new(globals.output).success(&format!("Command \"{}\" finished", command.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_args_parsing() {
        let args = ExecArgs::try_parse_from(["exec", "seed-db", "--show-log"]).unwrap();
        assert_eq!(args.command_id, "seed-db");
        assert!(args.show_log);
    }

    #[test]
    fn test_exec_args_requires_command_id() {
        assert!(ExecArgs::try_parse_from(["exec"]).is_err());
    }
}
