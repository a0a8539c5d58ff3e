//! # Devloop Validate Integration Tests
//!
//! File: cli/tests/validate.rs
//!
//! ## Overview
//!
//! `devloop validate` against temporary devfiles. No Docker needed.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_valid_devfile() {
    let project = project_with_devfile(NODE_DEVFILE);
    devloop_in(project.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (6 commands)"));
}

#[test]
fn test_devfile_flag_overrides_location() {
    let project = project_with_devfile("commands: []\n");
    std::fs::create_dir(project.path().join("api")).unwrap();
    std::fs::write(project.path().join("api/devfile.yaml"), NODE_DEVFILE).unwrap();
    devloop_in(project.path())
        .args(["--devfile", "api/devfile.yaml", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 commands"));
}

#[test]
fn test_reports_every_problem() {
    let devfile = r#"
components:
  - name: runtime
    container:
      image: alpine
commands:
  - id: loop
    composite:
      commands: [loop]
  - id: orphan
    exec:
      component: ghost
      commandLine: make orphan
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
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot reference itself"))
        .stderr(predicate::str::contains(
            "\"orphan\" does not map to a supported container component \"ghost\"",
        ))
        .stderr(predicate::str::contains(
            "command group build, currently there is no default command",
        ));
}

#[test]
fn test_duplicate_ids_are_case_insensitive() {
    let devfile = r#"
components:
  - name: runtime
    container:
      image: alpine
commands:
  - id: Build
    exec:
      component: runtime
      commandLine: make
  - id: build
    exec:
      component: runtime
      commandLine: make all
"#;
    let project = project_with_devfile(devfile);
    devloop_in(project.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate command id \"build\""));
}

#[test]
fn test_json_report() {
    let project = project_with_devfile(NODE_DEVFILE);
    devloop_in(project.path())
        .args(["-o", "json", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\":true"))
        .stdout(predicate::str::contains("\"commands\":6"));
}

#[test]
fn test_unknown_group_kind_fails_to_load() {
    let devfile = r#"
commands:
  - id: ship
    exec:
      component: runtime
      commandLine: make deploy
      group:
        kind: deploy
"#;
    let project = project_with_devfile(devfile);
    devloop_in(project.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported group kind \"deploy\""));
}
