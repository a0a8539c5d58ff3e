//! # Devfile Command Validation
//!
//! File: cli/src/devfile/validate.rs
//!
//! ## Overview
//!
//! Pre-flight checks that run before any command is built or executed:
//!
//! - **`validate_group`**: a group with more than one member needs exactly one
//!   default command. A group with a single member is implicitly its own default.
//! - **`validate_exec`**: an exec command must name a component and a command
//!   line, and the component must be an existing container component.
//! - **`validate_apply`**: an apply command must name an existing image,
//!   Kubernetes or OpenShift component.
//! - **`validate_composite`**: every reference of a composite command must
//!   resolve, must not point back at the composite itself or at any composite
//!   above it on the current path, and every leaf must itself be valid.
//! - **`validate_all`**: rejects duplicate ids and validates every command,
//!   stopping at the first problem.
//! - **`command_problems`**: the same checks, but every problem is returned.
//!
//! ## Architecture
//!
//! Cycle detection carries an explicit set of ancestor ids down the recursion.
//! Each branch gets its own copy, so siblings that share a sub-composite (a
//! diamond) are not mistaken for a cycle, and no shared mutable state exists
//! between independent validations.
//!
//! All functions return `CommandError` values and never panic on bad input.
//!
use crate::core::error::CommandError;
use crate::devfile::model::{
    commands_map, normalize_id, Command, CommandGroupKind, CommandKind, CommandMap, Component,
};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, instrument};

/// Checks the default-command invariant for one group kind.
pub fn validate_group(commands: &[Command], kind: CommandGroupKind) -> Result<(), CommandError> {
    let members: Vec<&Command> = commands
        .iter()
        .filter(|c| c.group_kind() == Some(kind))
        .collect();

    if members.len() <= 1 {
        return Ok(());
    }

    match members.iter().filter(|c| c.is_default()).count() {
        1 => Ok(()),
        0 => Err(CommandError::NoDefault { kind }),
        _ => Err(CommandError::MultipleDefaults { kind }),
    }
}

/// Checks a single exec command against the component list.
pub fn validate_exec(command: &Command, components: &[Component]) -> Result<(), CommandError> {
    let exec = command.as_exec().ok_or_else(|| CommandError::NotExec {
        id: command.id.clone(),
    })?;

    if exec.component.is_empty() {
        return Err(CommandError::MissingComponent {
            id: command.id.clone(),
        });
    }
    if exec.command_line.is_empty() {
        return Err(CommandError::MissingCommandLine {
            id: command.id.clone(),
        });
    }

    let targets_container = components
        .iter()
        .any(|c| c.is_container() && c.name == exec.component);
    if !targets_container {
        return Err(CommandError::UnknownContainer {
            id: command.id.clone(),
            component: exec.component.clone(),
        });
    }
    Ok(())
}

/// Checks that an apply command names an applicable component.
pub fn validate_apply(command: &Command, components: &[Component]) -> Result<(), CommandError> {
    let CommandKind::Apply(apply) = &command.kind else {
        return Err(CommandError::InvalidApplyComponent {
            id: command.id.clone(),
            component: String::new(),
        });
    };

    let applicable = !apply.component.is_empty()
        && components
            .iter()
            .any(|c| c.is_applicable() && c.name == apply.component);
    if !applicable {
        return Err(CommandError::InvalidApplyComponent {
            id: command.id.clone(),
            component: apply.component.clone(),
        });
    }
    Ok(())
}

/// Validates a composite command and, recursively, everything it references.
pub fn validate_composite(
    command: &Command,
    all_commands: &CommandMap<'_>,
    components: &[Component],
) -> Result<(), CommandError> {
    let mut ancestors = BTreeSet::new();
    ancestors.insert(normalize_id(&command.id));
    validate_composite_path(command, &ancestors, all_commands, components)
}

fn validate_composite_path(
    command: &Command,
    ancestors: &BTreeSet<String>,
    all_commands: &CommandMap<'_>,
    components: &[Component],
) -> Result<(), CommandError> {
    let Some(composite) = command.as_composite() else {
        return validate_leaf(command, components);
    };
    let own_id = normalize_id(&command.id);

    for reference in &composite.commands {
        let reference = normalize_id(reference);

        if reference == own_id {
            return Err(CommandError::SelfReference { id: own_id });
        }
        if ancestors.contains(&reference) {
            return Err(CommandError::IndirectReference { id: own_id });
        }

        let sub_command =
            all_commands
                .get(&reference)
                .ok_or_else(|| CommandError::MissingSubCommand {
                    parent: own_id.clone(),
                    child: reference.clone(),
                })?;

        if sub_command.as_composite().is_some() {
            let mut path = ancestors.clone();
            path.insert(reference.clone());
            // Propagated as-is so the user sees the root cause.
            validate_composite_path(sub_command, &path, all_commands, components)?;
        } else {
            validate_leaf(sub_command, components).map_err(|source| {
                CommandError::InvalidSubCommand {
                    parent: own_id.clone(),
                    child: reference.clone(),
                    source: Box::new(source),
                }
            })?;
        }
    }
    Ok(())
}

/// Exec and apply commands are leaves of the composite graph.
fn validate_leaf(command: &Command, components: &[Component]) -> Result<(), CommandError> {
    match command.kind {
        CommandKind::Apply(_) => validate_apply(command, components),
        _ => validate_exec(command, components),
    }
}

/// Validates any single command, dispatching on its variant.
pub fn validate_command(
    command: &Command,
    all_commands: &CommandMap<'_>,
    components: &[Component],
) -> Result<(), CommandError> {
    match command.kind {
        CommandKind::Composite(_) => validate_composite(command, all_commands, components),
        _ => validate_leaf(command, components),
    }
}

/// Every id that appears more than once, once each, in order of first repeat.
fn duplicate_ids(commands: &[Command]) -> Vec<CommandError> {
    let mut seen = HashSet::with_capacity(commands.len());
    let mut reported = HashSet::new();
    commands
        .iter()
        .map(|c| normalize_id(&c.id))
        .filter(|id| !seen.insert(id.clone()) && reported.insert(id.clone()))
        .map(|id| CommandError::DuplicateId { id })
        .collect()
}

/// Validates the whole command set: unique ids, then every command.
#[instrument(skip_all, fields(commands = commands.len()))]
pub fn validate_all(commands: &[Command], components: &[Component]) -> Result<(), CommandError> {
    if let Some(duplicate) = duplicate_ids(commands).into_iter().next() {
        return Err(duplicate);
    }

    let all_commands = commands_map(commands);
    for command in commands {
        debug!("Validating {} command '{}'", command.variant_name(), command.id);
        validate_command(command, &all_commands, components)?;
    }
    Ok(())
}

/// Runs the `validate_all` checks without stopping: duplicate ids first, then
/// the problem of each broken command in declaration order.
pub fn command_problems(commands: &[Command], components: &[Component]) -> Vec<CommandError> {
    let mut problems = duplicate_ids(commands);
    let all_commands = commands_map(commands);
    problems.extend(
        commands
            .iter()
            .filter_map(|c| validate_command(c, &all_commands, components).err()),
    );
    problems
}
