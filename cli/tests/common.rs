//! # Devloop CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test gets a
//! throwaway project directory holding a `devfile.yaml` and a `.git`
//! directory, so the search for `.devloop.toml` never leaves it. The user
//! configuration directory is redirected into the same temporary directory.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A devfile every subcommand accepts.
pub const NODE_DEVFILE: &str = r#"
schemaVersion: 2.2.0
metadata:
  name: shop
components:
  - name: runtime
    container:
      image: node:20
  - name: app-image
    image:
      imageName: shop/app:dev
      dockerfile:
        uri: Dockerfile
commands:
  - id: install
    exec:
      component: runtime
      commandLine: npm ci
      group:
        kind: init
  - id: compile
    exec:
      component: runtime
      commandLine: npm run build
      group:
        kind: build
        isDefault: true
  - id: serve
    exec:
      component: runtime
      commandLine: npm start
      hotReloadCapable: true
      group:
        kind: run
        isDefault: true
  - id: unit
    exec:
      component: runtime
      commandLine: npm test
      group:
        kind: test
  - id: image
    apply:
      component: app-image
  - id: ci
    composite:
      commands: [compile, unit]
"#;

/// Creates the `assert_cmd::Command` for the compiled `devloop` binary.
pub fn devloop_cmd() -> Command {
    Command::cargo_bin("devloop").expect("Failed to find devloop binary for testing")
}

/// A temporary project containing `devfile` as `devfile.yaml`.
pub fn project_with_devfile(devfile: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temporary project");
    fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");
    fs::write(dir.path().join("devfile.yaml"), devfile).expect("Failed to write devfile");
    dir
}

/// `devloop` running inside `project`, isolated from the real user config.
pub fn devloop_in(project: &Path) -> Command {
    let mut cmd = devloop_cmd();
    cmd.current_dir(project)
        .env("HOME", project)
        .env("XDG_CONFIG_HOME", project.join(".config"))
        .env_remove("DEVLOOP_DEVFILE")
        .env_remove("RUST_LOG");
    cmd
}
