//! # Devfile Command Resolution
//!
//! File: cli/src/devfile/resolve.rs
//!
//! ## Overview
//!
//! Picks the single command that serves a lifecycle phase (a `CommandGroupKind`)
//! for one invocation, either by the group's default rule or by an explicit id
//! given on the command line.
//!
//! ## Architecture
//!
//! - `resolve` is the primitive: it validates the whole group up front, then
//!   returns the default member, or the first member when none is marked
//!   default, or the command named by the caller.
//! - `resolve_push_commands` runs `resolve` for Init, Build and Run and gathers
//!   every failure into one `PushCommandsError` instead of stopping at the first.
//! - `resolve_debug_command` and `resolve_test_command` resolve a single
//!   mandatory group for `push --debug` and `test`.
//!
//! Resolution never mutates the `Devfile`. A command requested by id that
//! carries no group is returned as a copy with the requested group attached.
//!
use crate::core::error::CommandError;
use crate::devfile::model::{Command, CommandGroupKind, Devfile, Group};
use crate::devfile::validate::{validate_command, validate_group};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

/// The resolved command for each group of one push cycle. Only groups that
/// resolved to a command have an entry.
pub type PushCommandsMap = BTreeMap<CommandGroupKind, Command>;

/// Every resolution failure of a push cycle, plus whatever did resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct PushCommandsError {
    pub resolved: PushCommandsMap,
    pub errors: Vec<CommandError>,
}

impl fmt::Display for PushCommandsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("\n"))
    }
}

impl std::error::Error for PushCommandsError {}

/// Run and Test have no sensible fallback, so an empty group is an error.
fn is_mandatory(kind: CommandGroupKind) -> bool {
    matches!(kind, CommandGroupKind::Run | CommandGroupKind::Test)
}

/// Resolves the command for `kind`.
///
/// # Arguments
///
/// * `devfile` - The loaded devfile snapshot.
/// * `kind` - The lifecycle phase to resolve.
/// * `requested` - A command id given by the user. `None` or an empty string
///   selects by the group's default rule.
///
/// # Returns
///
/// * `Ok(Some(command))` - The resolved and validated command.
/// * `Ok(None)` - No command belongs to an optional group (Init, Build, Debug).
///
/// # Errors
///
/// Returns a `CommandError` when the group breaks the default-command rule, a
/// mandatory group is empty, the requested id is unknown or belongs to another
/// group, or the selected command fails validation.
#[instrument(skip(devfile))]
pub fn resolve(
    devfile: &Devfile,
    kind: CommandGroupKind,
    requested: Option<&str>,
) -> Result<Option<Command>, CommandError> {
    let commands = devfile.list_commands();
    let components = devfile.list_components();
    let all_commands = devfile.commands_map();

    if let Some(name) = requested.filter(|n| !n.is_empty()) {
        let found = devfile
            .find_command(name)
            .ok_or_else(|| CommandError::CommandNotFound {
                name: name.to_string(),
            })?;

        let command = match found.group {
            None => {
                debug!("Command '{}' has no group, treating it as {}", found.id, kind);
                let mut command = found.clone();
                command.group = Some(Group::new(kind, false));
                command
            }
            Some(group) if group.kind != kind => {
                return Err(CommandError::GroupMismatch {
                    id: found.id.clone(),
                    actual: group.kind,
                    requested: kind,
                });
            }
            Some(_) => found.clone(),
        };

        validate_command(&command, &all_commands, components)?;
        return Ok(Some(command));
    }

    validate_group(commands, kind)?;

    let mut fallback: Option<&Command> = None;
    for command in commands.iter().filter(|c| c.group_kind() == Some(kind)) {
        if command.is_default() {
            validate_command(command, &all_commands, components)?;
            debug!("Resolved default {} command '{}'", kind, command.id);
            return Ok(Some(command.clone()));
        }
        if fallback.is_none() {
            fallback = Some(command);
        }
    }

    match fallback {
        Some(command) => {
            validate_command(command, &all_commands, components)?;
            debug!("Resolved {} command '{}' (no default set)", kind, command.id);
            Ok(Some(command.clone()))
        }
        None if is_mandatory(kind) => Err(CommandError::GroupNotFound { kind }),
        None => Ok(None),
    }
}

/// Resolves Init, Build and Run for a push cycle.
///
/// All three groups are always attempted. On failure the error carries every
/// message, in Init, Build, Run order, and the partially resolved map. Callers
/// must not run anything from that partial map.
pub fn resolve_push_commands(
    devfile: &Devfile,
    init: Option<&str>,
    build: Option<&str>,
    run: Option<&str>,
) -> Result<PushCommandsMap, PushCommandsError> {
    let mut resolved = PushCommandsMap::new();
    let mut errors = Vec::new();

    let requests = [
        (CommandGroupKind::Init, init),
        (CommandGroupKind::Build, build),
        (CommandGroupKind::Run, run),
    ];
    for (kind, name) in requests {
        match resolve(devfile, kind, name) {
            Ok(Some(command)) => {
                resolved.insert(kind, command);
            }
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(PushCommandsError { resolved, errors })
    }
}

/// Resolves the Debug command. Mandatory when debugging.
pub fn resolve_debug_command(
    devfile: &Devfile,
    requested: Option<&str>,
) -> Result<Command, CommandError> {
    resolve(devfile, CommandGroupKind::Debug, requested)?.ok_or(CommandError::GroupNotFound {
        kind: CommandGroupKind::Debug,
    })
}

/// Resolves the Test command.
pub fn resolve_test_command(
    devfile: &Devfile,
    requested: Option<&str>,
) -> Result<Command, CommandError> {
    resolve(devfile, CommandGroupKind::Test, requested)?.ok_or(CommandError::GroupNotFound {
        kind: CommandGroupKind::Test,
    })
}
