//! # Project Context
//!
//! File: cli/src/commands/project.rs
//!
//! ## Overview
//!
//! What every subcommand needs before it can do anything: the merged
//! configuration, the loaded devfile, the project name and the state
//! directory. `Project::load` gathers them; `Project::executor` builds the
//! `DockerExecutor` for subcommands that run something.
//!
//! Relative paths (`--devfile`, `project.devfile`, `project.state_dir`) are
//! resolved against the current directory.
//!
use crate::commands::GlobalOptions;
use crate::common::docker::DockerExecutor;
use crate::common::ui::OutputFormat;
use crate::core::config::{self, Config};
use crate::core::error::{CommandError, Result};
use crate::devfile::loader::load_devfile;
use crate::devfile::model::Devfile;
use crate::devfile::validate::validate_all;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const FALLBACK_PROJECT_NAME: &str = "devloop";

#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub config: Config,
    pub devfile: Devfile,
    pub devfile_path: PathBuf,
    pub state_dir: PathBuf,
}

impl Project {
    pub fn load(globals: &GlobalOptions) -> Result<Self> {
        let config = config::load_config().context("Failed to load Devloop configuration")?;
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let devfile_path = cwd.join(
            globals
                .devfile
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.project.devfile)),
        );
        let devfile = load_devfile(&devfile_path)?;
        let name = project_name(config.project.name.as_deref(), devfile.name(), &cwd);
        let state_dir = cwd.join(&config.project.state_dir);
        debug!(
            "Project '{}' (devfile {}, state {})",
            name,
            devfile_path.display(),
            state_dir.display()
        );

        Ok(Self {
            name,
            config,
            devfile,
            devfile_path,
            state_dir,
        })
    }

    /// Directory the devfile lives in; image build contexts are relative to it.
    pub fn devfile_dir(&self) -> PathBuf {
        self.devfile_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Checks every command of the devfile (ids, components, composite graph).
    pub fn validate_commands(&self) -> std::result::Result<(), CommandError> {
        validate_all(
            self.devfile.list_commands(),
            self.devfile.list_components(),
        )
    }

    pub fn executor(&self, format: OutputFormat) -> Arc<DockerExecutor> {
        Arc::new(DockerExecutor::new(
            self.name.clone(),
            self.config.clone(),
            self.devfile.list_components().to_vec(),
            self.devfile_dir(),
            format,
        ))
    }
}

/// Configured name, then the devfile's `metadata.name`, then the directory name.
pub fn project_name(configured: Option<&str>, devfile_name: Option<&str>, cwd: &Path) -> String {
    let non_empty = |n: &&str| !n.trim().is_empty();
    configured
        .filter(non_empty)
        .or(devfile_name.filter(non_empty))
        .map(str::to_string)
        .or_else(|| {
            cwd.file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
}
