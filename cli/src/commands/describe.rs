//! # Devloop Describe Command
//!
//! File: cli/src/commands/describe.rs
//!
//! ## Overview
//!
//! `devloop describe` shows the devfile's commands and which Init, Build and
//! Run commands a `push` with the same flags would use. Nothing is executed.
//!
//! ```bash
//! devloop describe
//! devloop describe --run-command serve-dev
//! devloop -o json describe
//! ```
//!
//! If the push set cannot be resolved, the part that did resolve is still
//! printed and the command fails with every resolution error.
//!
use crate::commands::{project::Project, GlobalOptions};
use crate::common::ui::Output;
use crate::core::error::Result;
use crate::devfile::model::{Command, CommandGroupKind};
use crate::devfile::resolve::{resolve_push_commands, PushCommandsMap};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "List devfile commands and the commands a push would run")]
pub struct DescribeArgs {
    /// Init command to use instead of the group default.
    #[arg(long)]
    init_command: Option<String>,

    /// Build command to use instead of the group default.
    #[arg(long)]
    build_command: Option<String>,

    /// Run command to use instead of the group default.
    #[arg(long)]
    run_command: Option<String>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandSummary {
    pub id: String,
    pub kind: String,
    pub group: Option<String>,
    pub is_default: bool,
}

impl From<&Command> for CommandSummary {
    fn from(command: &Command) -> Self {
        Self {
            id: command.id.clone(),
            kind: command.variant_name().to_string(),
            group: command.group_kind().map(|k| k.to_string()),
            is_default: command.is_default(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Description {
    name: String,
    commands: Vec<CommandSummary>,
    push_commands: BTreeMap<String, String>,
    errors: Vec<String>,
}

/// `(group, command id)` rows in lifecycle order.
fn push_rows(resolved: &PushCommandsMap) -> Vec<(CommandGroupKind, String)> {
    CommandGroupKind::ALL
        .iter()
        .filter_map(|kind| resolved.get(kind).map(|c| (*kind, c.id.clone())))
        .collect()
}

pub async fn handle_describe(args: DescribeArgs, globals: &GlobalOptions) -> Result<()> {
    info!("Handling describe command...");
    let project = Project::load(globals)?;
    let output = Output::new(globals.output);

    let summaries: Vec<CommandSummary> = project
        .devfile
        .list_commands()
        .iter()
        .map(CommandSummary::from)
        .collect();

    let (resolved, failure) = match resolve_push_commands(
        &project.devfile,
        args.init_command.as_deref(),
        args.build_command.as_deref(),
        args.run_command.as_deref(),
    ) {
        Ok(resolved) => (resolved, None),
        Err(e) => (e.resolved.clone(), Some(e)),
    };
    let rows = push_rows(&resolved);

    if output.is_json() {
        output.data(&Description {
            name: project.name.clone(),
            commands: summaries,
            push_commands: rows
                .iter()
                .map(|(kind, id)| (kind.to_string(), id.clone()))
                .collect(),
            errors: failure
                .as_ref()
                .map(|e| e.errors.iter().map(|x| x.to_string()).collect())
                .unwrap_or_default(),
        });
    } else {
        println!("Project: {}", project.name);
        println!("Devfile: {}\n", project.devfile_path.display());
        let table_rows: Vec<Vec<String>> = summaries
            .iter()
            .map(|s| {
                vec![
                    s.id.clone(),
                    s.kind.clone(),
                    s.group.clone().unwrap_or_else(|| "-".into()),
                    if s.is_default { "yes".into() } else { "".into() },
                ]
            })
            .collect();
        output.table(&["ID", "KIND", "GROUP", "DEFAULT"], &table_rows);

        println!("\nPush commands:");
        let push_table: Vec<Vec<String>> = rows
            .iter()
            .map(|(kind, id)| vec![kind.to_string(), id.clone()])
            .collect();
        output.table(&["GROUP", "COMMAND"], &push_table);
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
