//! # Devloop Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for Devloop: loading,
//! merging, validation and access to configuration data. It combines built-in
//! defaults, user settings and project-specific overrides.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.devloop.toml` in the current directory or its ancestors
//!    (the search stops at a directory containing `.git`)
//! 2. User-specific `<config_dir>/devloop/config.toml`
//! 3. Default values defined in the code
//!
//! After merging, `~` in paths is expanded and the result is validated before
//! any command runs.
//!
//! ## Sections
//!
//! ```toml
//! [project]
//! name = "shop"                # container name prefix; defaults to metadata.name
//! devfile = "devfile.yaml"
//! state_dir = ".devloop"
//!
//! [containers]
//! name_template = "{project}-{component}"
//! overrides = { runtime = "shop-dev" }
//!
//! [supervisor]
//! binary = "/opt/odo/bin/supervisord"
//! conf_path = "/opt/odo/conf/devfile-supervisor.conf"
//! run_program = "devrun"
//! debug_program = "debugrun"
//! script_dir = "/opt/devloop/run"
//! ```
//!
//! The supervisor configuration in the image is expected to launch each program
//! as `/bin/sh <script_dir>/<program>.sh`. `push` writes the resolved Run or
//! Debug command line into that script before starting the program.
//!
//! The configuration is loaded once per command execution and passed to the
//! modules that need it.
//!
use crate::core::error::{DevloopError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub containers: ContainersConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

/// Where the devfile and the push state live.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name used in container names. Falls back to the devfile's
    /// `metadata.name`, then to the current directory name.
    pub name: Option<String>,
    /// Path to the devfile (can use ~). Will be expanded.
    #[serde(default = "default_devfile")]
    pub devfile: String,
    /// Directory holding `state.toml` (can use ~). Will be expanded.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

/// How devfile components map to Docker containers.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainersConfig {
    /// Template with `{project}` and `{component}` placeholders.
    #[serde(default = "default_name_template")]
    pub name_template: String,
    /// Explicit container names per component; these win over the template.
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

/// The process supervisor running inside component containers.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SupervisorConfig {
    /// Absolute path of the supervisor binary inside the container.
    #[serde(default = "default_supervisor_binary")]
    pub binary: String,
    /// Absolute path of the supervisor configuration inside the container.
    #[serde(default = "default_supervisor_conf")]
    pub conf_path: String,
    /// Program started for the Run command.
    #[serde(default = "default_run_program")]
    pub run_program: String,
    /// Program started for the Debug command.
    #[serde(default = "default_debug_program")]
    pub debug_program: String,
    /// Directory inside the container holding one `<program>.sh` per program.
    #[serde(default = "default_script_dir")]
    pub script_dir: String,
}

fn default_devfile() -> String {
    "devfile.yaml".to_string()
}
fn default_state_dir() -> String {
    ".devloop".to_string()
}
fn default_name_template() -> String {
    "{project}-{component}".to_string()
}
fn default_supervisor_binary() -> String {
    "/opt/odo/bin/supervisord".to_string()
}
fn default_supervisor_conf() -> String {
    "/opt/odo/conf/devfile-supervisor.conf".to_string()
}
fn default_run_program() -> String {
    "devrun".to_string()
}
fn default_debug_program() -> String {
    "debugrun".to_string()
}
fn default_script_dir() -> String {
    "/opt/devloop/run".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            devfile: default_devfile(),
            state_dir: default_state_dir(),
        }
    }
}

impl Default for ContainersConfig {
    fn default() -> Self {
        Self {
            name_template: default_name_template(),
            overrides: HashMap::new(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            binary: default_supervisor_binary(),
            conf_path: default_supervisor_conf(),
            run_program: default_run_program(),
            debug_program: default_debug_program(),
            script_dir: default_script_dir(),
        }
    }
}

impl ContainersConfig {
    /// Name of the container backing `component`.
    pub fn container_name(&self, project: &str, component: &str) -> String {
        match self.overrides.get(component) {
            Some(name) => name.clone(),
            None => self
                .name_template
                .replace("{project}", project)
                .replace("{component}", component),
        }
    }
}

impl SupervisorConfig {
    /// Program name for the run or debug mode.
    pub fn program(&self, debug: bool) -> &str {
        if debug {
            &self.debug_program
        } else {
            &self.run_program
        }
    }

    /// Path of the script the supervisor runs for `program`.
    pub fn script_path(&self, program: &str) -> String {
        format!("{}/{}.sh", self.script_dir.trim_end_matches('/'), program)
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".devloop.toml";

/// Loads, merges, expands and validates the configuration.
///
/// # Returns
///
/// * `Result<Config>` - The final configuration.
///
/// # Errors
///
/// Returns an error if a configuration file cannot be read or parsed, or if
/// the merged configuration fails validation.
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Devloop", "devloop") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.devloop.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.devloop.toml`, stopping at a `.git` directory.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Picks the project value unless it is still the built-in default.
fn pick(project: String, user: String, default: fn() -> String) -> String {
    if project != default() {
        project
    } else {
        user
    }
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };

    let mut overrides = user.containers.overrides;
    overrides.extend(project_cfg.containers.overrides);

    Config {
        project: ProjectConfig {
            name: project_cfg.project.name.or(user.project.name),
            devfile: pick(project_cfg.project.devfile, user.project.devfile, default_devfile),
            state_dir: pick(
                project_cfg.project.state_dir,
                user.project.state_dir,
                default_state_dir,
            ),
        },
        containers: ContainersConfig {
            name_template: pick(
                project_cfg.containers.name_template,
                user.containers.name_template,
                default_name_template,
            ),
            overrides,
        },
        supervisor: SupervisorConfig {
            binary: pick(
                project_cfg.supervisor.binary,
                user.supervisor.binary,
                default_supervisor_binary,
            ),
            conf_path: pick(
                project_cfg.supervisor.conf_path,
                user.supervisor.conf_path,
                default_supervisor_conf,
            ),
            run_program: pick(
                project_cfg.supervisor.run_program,
                user.supervisor.run_program,
                default_run_program,
            ),
            debug_program: pick(
                project_cfg.supervisor.debug_program,
                user.supervisor.debug_program,
                default_debug_program,
            ),
            script_dir: pick(
                project_cfg.supervisor.script_dir,
                user.supervisor.script_dir,
                default_script_dir,
            ),
        },
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.project.devfile = shellexpand::tilde(&config.project.devfile).into_owned();
    config.project.state_dir = shellexpand::tilde(&config.project.state_dir).into_owned();
    debug!(
        "Expanded devfile path: {}, state dir: {}",
        config.project.devfile, config.project.state_dir
    );
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.project.devfile.is_empty() {
        return Err(anyhow!(DevloopError::Config(
            "project.devfile cannot be empty.".to_string()
        )));
    }
    if config.project.state_dir.is_empty() {
        return Err(anyhow!(DevloopError::Config(
            "project.state_dir cannot be empty.".to_string()
        )));
    }
    if !config.containers.name_template.contains("{component}") {
        return Err(anyhow!(DevloopError::Config(format!(
            "containers.name_template '{}' must contain '{{component}}'.",
            config.containers.name_template
        ))));
    }
    // Paths inside the container, so always POSIX.
    for (key, value) in [
        ("supervisor.binary", &config.supervisor.binary),
        ("supervisor.conf_path", &config.supervisor.conf_path),
        ("supervisor.script_dir", &config.supervisor.script_dir),
    ] {
        if !value.starts_with('/') {
            return Err(anyhow!(DevloopError::Config(format!(
                "{} must be an absolute path inside the container, got '{}'.",
                key, value
            ))));
        }
    }
    for (key, value) in [
        ("supervisor.run_program", &config.supervisor.run_program),
        ("supervisor.debug_program", &config.supervisor.debug_program),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!(DevloopError::Config(format!(
                "{} cannot be empty.",
                key
            ))));
        }
    }
    info!("Configuration validation successful.");
    Ok(())
}
