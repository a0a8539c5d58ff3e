//! # Devloop CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `devloop` binary: `--help`, `--version`, and
//! argument errors.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    devloop_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("describe"));
}

#[test]
fn test_version_flag() {
    devloop_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_push_help_lists_flags() {
    devloop_cmd()
        .args(["push", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force-restart"))
        .stdout(predicate::str::contains("--debug-command"));
}

#[test]
fn test_unknown_output_format_rejected() {
    devloop_cmd()
        .args(["-o", "yaml", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn test_missing_devfile_reported() {
    let project = tempfile::tempdir().unwrap();
    std::fs::create_dir(project.path().join(".git")).unwrap();
    devloop_in(project.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read devfile"));
}
