//! # Devloop Test Command
//!
//! File: cli/src/commands/test.rs
//!
//! ## Overview
//!
//! `devloop test` resolves the Test command (the group default, the single
//! member, or `--test-command`) and runs it once in its component container.
//! A devfile without a Test command is an error.
//!
//! ```bash
//! devloop test --show-log
//! devloop test --test-command unit
//! ```
//!
use crate::commands::{project::Project, GlobalOptions};
use crate::common::ui::Output;
use crate::core::error::Result;
use crate::devfile::lifecycle::exec_command;
use crate::devfile::resolve::resolve_test_command;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Run the devfile's Test command")]
pub struct TestArgs {
    /// Test command to use instead of the group default.
    #[arg(long)]
    test_command: Option<String>,

    /// Show the output of the executed commands.
    #[arg(long)]
    show_log: bool,
}

pub async fn handle_test(args: TestArgs, globals: &GlobalOptions) -> Result<()> {
    info!("Handling test command...");
    let project = Project::load(globals)?;
    project.validate_commands()?;

    let command = resolve_test_command(&project.devfile, args.test_command.as_deref())?;
    exec_command(
        &project.devfile,
        &command,
        args.show_log,
        project.executor(globals.output),
    )
    .await?;

    Output::new(globals.output).success(&format!("Test command \"{}\" passed", command.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_args_parsing() {
        let args = TestArgs::try_parse_from(["test", "--test-command", "unit", "--show-log"])
            .unwrap();
        assert_eq!(args.test_command.as_deref(), Some("unit"));
        assert!(args.show_log);
    }
}
