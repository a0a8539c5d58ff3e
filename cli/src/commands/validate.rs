//! # Devloop Validate Command
//!
//! File: cli/src/commands/validate.rs
//!
//! ## Overview
//!
//! `devloop validate` checks the devfile without touching Docker:
//!
//! 1. every command (unique ids, exec components and command lines, apply
//!    targets, composite references and cycles);
//! 2. every command group has at most one default when it has several members.
//!
//! All problems are reported together, one per broken command and per
//! broken group.
//!
//! ```bash
//! devloop validate
//! devloop --devfile other/devfile.yaml -o json validate
//! ```
//!
use crate::commands::{project::Project, GlobalOptions};
use crate::common::ui::Output;
use crate::core::error::{DevloopError, Result};
use crate::devfile::model::{CommandGroupKind, Devfile};
use crate::devfile::validate::{command_problems, validate_group};
use anyhow::anyhow;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Validate the devfile's commands and command groups")]
pub struct ValidateArgs {}

#[derive(Serialize, Debug)]
struct ValidationReport<'a> {
    devfile: String,
    commands: usize,
    valid: bool,
    errors: &'a [String],
}

/// Every validation problem of the devfile, commands first, then groups in
/// `CommandGroupKind::ALL` order.
pub fn collect_problems(devfile: &Devfile) -> Vec<String> {
    let mut problems: Vec<String> =
        command_problems(devfile.list_commands(), devfile.list_components())
            .iter()
            .map(ToString::to_string)
            .collect();
    for kind in CommandGroupKind::ALL {
        if let Err(e) = validate_group(devfile.list_commands(), kind) {
            debug!("Group {} is invalid: {}", kind, e);
            problems.push(e.to_string());
        }
    }
    problems
}

pub async fn handle_validate(_args: ValidateArgs, globals: &GlobalOptions) -> Result<()> {
    info!("Handling validate command...");
    let project = Project::load(globals)?;
    let output = Output::new(globals.output);

    let problems = collect_problems(&project.devfile);

    if output.is_json() {
        output.data(&ValidationReport {
            devfile: project.devfile_path.display().to_string(),
            commands: project.devfile.list_commands().len(),
            valid: problems.is_empty(),
            errors: &problems,
        });
    }

    if problems.is_empty() {
        output.success(&format!(
            "{} is valid ({} commands)",
            project.devfile_path.display(),
            project.devfile.list_commands().len()
        ));
        Ok(())
    } else {
        Err(anyhow!(DevloopError::Devfile(format!(
            "{} is invalid:\n  - {}",
            project.devfile_path.display(),
            problems.join("\n  - ")
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devfile::model::{Command, CommandKind, Component, Events, ExecCommand};

    fn exec(id: &str) -> Command {
        Command::exec(
            id,
            ExecCommand {
                component: "runtime".into(),
                command_line: format!("make {}", id),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_collect_problems_reports_every_group() {
        let devfile = Devfile::new(
            None,
            vec![
                exec("a").with_group(CommandGroupKind::Build, false),
                exec("b").with_group(CommandGroupKind::Build, false),
                exec("c").with_group(CommandGroupKind::Test, true),
                exec("d").with_group(CommandGroupKind::Test, true),
            ],
            vec![Component::container("runtime", "alpine")],
            Events::default(),
        );
        let problems = collect_problems(&devfile);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("group build") && problems[0].contains("no default"));
        assert!(problems[1].contains("group test") && problems[1].contains("more than one"));
    }

    #[test]
    fn test_collect_problems_reports_every_broken_command() {
        let mut no_line = exec("a");
        if let CommandKind::Exec(e) = &mut no_line.kind {
            e.command_line.clear();
        }
        let mut ghost = exec("b");
        if let CommandKind::Exec(e) = &mut ghost.kind {
            e.component = "ghost".into();
        }
        let devfile = Devfile::new(
            None,
            vec![no_line, ghost, exec("c")],
            vec![Component::container("runtime", "alpine")],
            Events::default(),
        );
        let problems = collect_problems(&devfile);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("\"a\" must have a command line"));
        assert!(problems[1].contains("\"b\"") && problems[1].contains("\"ghost\""));
    }

    #[test]
    fn test_validate_args_parse() {
        assert!(ValidateArgs::try_parse_from(["validate"]).is_ok());
        assert!(ValidateArgs::try_parse_from(["validate", "extra"]).is_err());
    }
}
