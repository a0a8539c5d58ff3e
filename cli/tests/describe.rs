//! # Devloop Describe Integration Tests
//!
//! File: cli/tests/describe.rs
//!
//! ## Overview
//!
//! `devloop describe` shows the resolved push commands without running
//! anything, so it works without Docker.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_describe_lists_commands_and_push_set() {
    let project = project_with_devfile(NODE_DEVFILE);
    devloop_in(project.path())
        .arg("describe")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: shop"))
        .stdout(predicate::str::contains("composite"))
        .stdout(predicate::str::is_match(r"init\s+install").unwrap())
        .stdout(predicate::str::is_match(r"build\s+compile").unwrap())
        .stdout(predicate::str::is_match(r"run\s+serve").unwrap());
}

#[test]
fn test_describe_with_requested_command() {
    let project = project_with_devfile(NODE_DEVFILE);
    devloop_in(project.path())
        .args(["-o", "json", "describe", "--build-command", "CI"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"build\":\"ci\""));
}

#[test]
fn test_describe_group_mismatch() {
    let project = project_with_devfile(NODE_DEVFILE);
    devloop_in(project.path())
        .args(["describe", "--run-command", "compile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "command compile is of group build in devfile.yaml, but was requested as run",
        ));
}

#[test]
fn test_describe_reports_all_resolution_errors() {
    let devfile = r#"
components:
  - name: runtime
    container:
      image: alpine
commands:
  - id: a
    exec:
      component: runtime
      commandLine: make a
      group:
        kind: build
  - id: b
    exec:
      component: runtime
      commandLine: make b
      group:
        kind: build
"#;
    let project = project_with_devfile(devfile);
    devloop_in(project.path())
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no default command"))
        .stderr(predicate::str::contains(
            "the command group of kind \"run\" is not found in the devfile",
        ));
}

#[test]
fn test_project_name_from_config() {
    let project = project_with_devfile(NODE_DEVFILE);
    std::fs::write(
        project.path().join(".devloop.toml"),
        "[project]\nname = \"storefront\"\n",
    )
    .unwrap();
    devloop_in(project.path())
        .arg("describe")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: storefront"));
}
