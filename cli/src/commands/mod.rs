//! # Devloop Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per `devloop` subcommand. Each defines its `clap` argument
//! struct and an async `handle_*` function that `main.rs` dispatches to.
//!
//! - `validate`: check the devfile's commands and command groups.
//! - `describe`: list the commands and the Init/Build/Run set a push would use.
//! - `push`: run the push cycle against the component container.
//! - `test`: run the Test command.
//! - `exec`: run any command by id.
//! - `stop`: run `preStop` events and stop the supervisor programs.
//!
//! `project` holds the shared loading of configuration and devfile.
//!
use crate::common::ui::OutputFormat;
use std::path::PathBuf;

pub mod describe;
pub mod exec;
pub mod project;
pub mod push;
pub mod stop;
pub mod test;
pub mod validate;

/// Options given before the subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub output: OutputFormat,
    /// Overrides `project.devfile` from the configuration.
    pub devfile: Option<PathBuf>,
}
