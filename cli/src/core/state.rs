//! # Devloop Push State
//!
//! File: cli/src/core/state.rs
//!
//! ## Overview
//!
//! Remembers what the last `push` did so the next one can tell a first
//! creation from an update, and a restart from a plain update. The state is a
//! small TOML file at `<state_dir>/state.toml`:
//!
//! ```toml
//! container_id = "3f2a..."
//! debug = false
//! command_line = "cd /projects && npm start"
//! ```
//!
//! It is written as soon as the supervisor is up in a container, and again
//! when a push completes.
//!
use crate::core::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STATE_FILENAME: &str = "state.toml";

/// Outcome of the last push.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PushState {
    /// Id of the container the supervisor was initialized in.
    pub container_id: String,
    /// Whether the debug program was started.
    pub debug: bool,
    /// Shell line written into the program's script.
    #[serde(default)]
    pub command_line: String,
}

/// How the coming push relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushHistory {
    pub component_exists: bool,
    pub run_mode_changed: bool,
}

pub fn state_path(state_dir: &Path) -> PathBuf {
    state_dir.join(STATE_FILENAME)
}

/// Reads the state file. A missing file means no previous push.
pub fn load_state(state_dir: &Path) -> Result<Option<PushState>> {
    let path = state_path(state_dir);
    if !path.exists() {
        debug!("No push state at {}", path.display());
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read push state: {}", path.display()))?;
    let state = toml::from_str(&content)
        .with_context(|| format!("Failed to parse push state: {}", path.display()))?;
    Ok(Some(state))
}

pub fn save_state(state_dir: &Path, state: &PushState) -> Result<()> {
    fs::create_dir_all(state_dir).with_context(|| {
        format!("Failed to create state directory: {}", state_dir.display())
    })?;
    let path = state_path(state_dir);
    let content = toml::to_string(state).context("Failed to serialize push state")?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write push state: {}", path.display()))?;
    info!("Recorded push state in {}", path.display());
    Ok(())
}

/// Removes the state file, if any.
pub fn clear_state(state_dir: &Path) -> Result<()> {
    let path = state_path(state_dir);
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove push state: {}", path.display()))?;
    }
    Ok(())
}

/// Compares the recorded state with the container that is there now.
///
/// The component only "exists" for the supervisor if it is the very container
/// recorded at the last push; a recreated container needs a fresh supervisor.
/// A different mode or a different program command line counts as a mode
/// change, so a hot-reload program is restarted with its new script.
pub fn push_history(
    previous: Option<&PushState>,
    current: &PushState,
    force_restart: bool,
) -> PushHistory {
    let component_exists = previous.is_some_and(|p| p.container_id == current.container_id);
    let mode_changed = component_exists
        && previous
            .is_some_and(|p| p.debug != current.debug || p.command_line != current.command_line);
    PushHistory {
        component_exists,
        run_mode_changed: mode_changed || force_restart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_state_roundtrip_and_clear() {
        let temp_dir = tempdir().unwrap();
        let state_dir = temp_dir.path().join(".devloop");
        assert_eq!(load_state(&state_dir).unwrap(), None);

        let state = PushState {
            container_id: "abc123".into(),
            debug: true,
            command_line: "npm start".into(),
        };
        save_state(&state_dir, &state).unwrap();
        assert_eq!(load_state(&state_dir).unwrap(), Some(state));

        clear_state(&state_dir).unwrap();
        assert_eq!(load_state(&state_dir).unwrap(), None);
        clear_state(&state_dir).unwrap(); // Clearing twice is fine
    }

    #[test]
    fn test_corrupt_state_is_an_error() {
        let temp_dir = tempdir().unwrap();
        fs::write(state_path(temp_dir.path()), "container_id = 3").unwrap();
        assert!(load_state(temp_dir.path()).is_err());
    }

    #[test]
    fn test_state_without_command_line_still_loads() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            state_path(temp_dir.path()),
            "container_id = \"abc\"\ndebug = false\n",
        )
        .unwrap();
        let state = load_state(temp_dir.path()).unwrap().unwrap();
        assert_eq!(state.command_line, "");
    }

    #[test]
    fn test_push_history() {
        let state = |id: &str, debug: bool, line: &str| PushState {
            container_id: id.into(),
            debug,
            command_line: line.into(),
        };
        let previous = state("abc", false, "npm start");

        let first = push_history(None, &state("abc", false, "npm start"), false);
        assert!(!first.component_exists);
        assert!(!first.run_mode_changed);

        let same = push_history(Some(&previous), &state("abc", false, "npm start"), false);
        assert!(same.component_exists);
        assert!(!same.run_mode_changed);

        let switched = push_history(Some(&previous), &state("abc", true, "npm start"), false);
        assert!(switched.run_mode_changed);

        let other_command =
            push_history(Some(&previous), &state("abc", false, "npm run dev"), false);
        assert!(other_command.component_exists);
        assert!(other_command.run_mode_changed);

        let recreated = push_history(Some(&previous), &state("def", true, "npm start"), false);
        assert!(!recreated.component_exists);
        assert!(!recreated.run_mode_changed);

        let forced = push_history(Some(&previous), &state("abc", false, "npm start"), true);
        assert!(forced.run_mode_changed);
    }
}
