//! # Devloop Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout Devloop. There are two
//! families:
//!
//! - `CommandError`: problems found in the devfile itself while validating or
//!   resolving commands (duplicate ids, group default violations, broken
//!   composite references, invalid component references). These are detected
//!   before anything runs and are always fatal to the requested operation.
//! - `DevloopError`: application errors raised while loading configuration,
//!   talking to Docker or executing commands inside a container.
//!
//! ## Architecture
//!
//! - `CommandError` is `Clone + PartialEq` so the validation and resolution
//!   code can return it directly and tests can compare exact variants.
//! - `Result<T>` is an alias for `anyhow::Result<T>`; code that does I/O
//!   returns it and attaches context with `anyhow::Context`.
//!
//! ## Examples
//!
//! ```rust
//! // Validation errors are plain values.
//! let err = CommandError::SelfReference { id: "build-all".into() };
//! assert!(err.to_string().contains("cannot reference itself"));
//!
//! // Application errors travel inside anyhow and can be recovered by downcasting.
//! match result {
//!     Err(e) if e.downcast_ref::<DevloopError>().is_some_and(|de| matches!(de, DevloopError::ContainerNotFound { .. })) => {
//!         println!("Container not found");
//!     }
//!     other => other?,
//! }
//! ```
//!
use crate::devfile::model::CommandGroupKind;
use thiserror::Error;

/// Errors describing an invalid or unresolvable devfile command set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("duplicate command id \"{id}\" in devfile (ids are case-insensitive)")]
    DuplicateId { id: String },

    #[error("there should be exactly one default command for command group {kind}, currently there is no default command")]
    NoDefault { kind: CommandGroupKind },

    #[error("there should be exactly one default command for command group {kind}, currently there is more than one default command")]
    MultipleDefaults { kind: CommandGroupKind },

    #[error("the command group of kind \"{kind}\" is not found in the devfile")]
    GroupNotFound { kind: CommandGroupKind },

    #[error("the command \"{name}\" is not found in the devfile")]
    CommandNotFound { name: String },

    #[error("command group mismatched, command {id} is of group {actual} in devfile.yaml, but was requested as {requested}")]
    GroupMismatch {
        id: String,
        actual: CommandGroupKind,
        requested: CommandGroupKind,
    },

    #[error("command \"{id}\" must be of type \"exec\"")]
    NotExec { id: String },

    #[error("exec command \"{id}\" must reference a component")]
    MissingComponent { id: String },

    #[error("exec command \"{id}\" must have a command line")]
    MissingCommandLine { id: String },

    #[error("exec command \"{id}\" does not map to a supported container component \"{component}\"")]
    UnknownContainer { id: String, component: String },

    #[error("apply command \"{id}\" does not map to an applicable component \"{component}\"")]
    InvalidApplyComponent { id: String, component: String },

    #[error("the composite command \"{id}\" cannot reference itself")]
    SelfReference { id: String },

    #[error("the composite command \"{id}\" cannot indirectly reference itself")]
    IndirectReference { id: String },

    #[error("the command \"{child}\" mentioned in the composite command \"{parent}\" does not exist in the devfile")]
    MissingSubCommand { parent: String, child: String },

    #[error("the composite command \"{parent}\" references an invalid command \"{child}\": {source}")]
    InvalidSubCommand {
        parent: String,
        child: String,
        source: Box<CommandError>,
    },
}

/// Custom error type for the Devloop application.
#[derive(Error, Debug)]
pub enum DevloopError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Devfile error: {0}")]
    Devfile(String),

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Docker API interaction failed: {source}")]
    DockerApi {
        #[from]
        source: bollard::errors::Error,
    },

    #[error("Docker operation failed: {0}")]
    DockerOperation(String),

    #[error("Container '{name}' not found.")]
    ContainerNotFound { name: String },

    #[error("Container '{name}' is not running. Start the component container before pushing.")]
    ContainerNotRunning { name: String },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("unable to execute command \"{id}\" ({command_line}) in component \"{component}\"")]
    CommandExecution {
        id: String,
        component: String,
        command_line: String,
    },

    #[error("parallel command execution failed for \"{id}\": {}", .failures.join("; "))]
    ParallelExecution { id: String, failures: Vec<String> },

    #[error("component \"{component}\" cannot be applied: {reason}")]
    Apply { component: String, reason: String },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let no_default = CommandError::NoDefault {
            kind: CommandGroupKind::Build,
        };
        assert_eq!(
            no_default.to_string(),
            "there should be exactly one default command for command group build, currently there is no default command"
        );

        let missing = CommandError::MissingSubCommand {
            parent: "all".into(),
            child: "lint".into(),
        };
        assert_eq!(
            missing.to_string(),
            "the command \"lint\" mentioned in the composite command \"all\" does not exist in the devfile"
        );
    }

    #[test]
    fn test_invalid_sub_command_keeps_root_cause() {
        let err = CommandError::InvalidSubCommand {
            parent: "all".into(),
            child: "compile".into(),
            source: Box::new(CommandError::MissingCommandLine {
                id: "compile".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"all\""));
        assert!(msg.contains("\"compile\""));
        assert!(msg.contains("must have a command line"));
    }

    #[test]
    fn test_devloop_error_display() {
        let not_found = DevloopError::ContainerNotFound {
            name: "shop-runtime".into(),
        };
        assert_eq!(not_found.to_string(), "Container 'shop-runtime' not found.");

        let parallel = DevloopError::ParallelExecution {
            id: "checks".into(),
            failures: vec!["lint failed".into(), "unit failed".into()],
        };
        assert_eq!(
            parallel.to_string(),
            "parallel command execution failed for \"checks\": lint failed; unit failed"
        );
    }
}
