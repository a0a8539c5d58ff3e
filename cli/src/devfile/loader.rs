//! # Devfile Loader
//!
//! File: cli/src/devfile/loader.rs
//!
//! ## Overview
//!
//! Reads `devfile.yaml` into the `Devfile` snapshot. This is a thin reader for
//! the part of the devfile v2 schema that the engine consumes, not a schema
//! validator: unknown top-level sections (`starterProjects`, `projects`,
//! `variables`, ...) and unknown fields are ignored.
//!
//! ## Accepted shape
//!
//! ```yaml
//! schemaVersion: 2.2.0
//! metadata:
//!   name: shop
//! components:
//!   - name: runtime
//!     container:
//!       image: node:20
//! commands:
//!   - id: run
//!     exec:
//!       component: runtime
//!       commandLine: npm start
//!       workingDir: ${PROJECT_SOURCE}
//!       hotReloadCapable: true
//!       group:
//!         kind: run
//!         isDefault: true
//! events:
//!   postStart: [install]
//! ```
//!
//! Each command must carry exactly one of `exec`, `composite` or `apply`, and
//! each component exactly one of `container`, `image`, `kubernetes`,
//! `openshift` or `volume`. Group kinds other than the five the engine knows
//! are rejected.
//!
use crate::core::error::{DevloopError, Result};
use crate::devfile::model::{
    ApplyCommand, Command, CommandGroupKind, CommandKind, CompositeCommand, Component,
    ComponentKind, ContainerComponent, Devfile, EnvVar, Events, ExecCommand, Group,
    ImageComponent, ManifestComponent,
};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawDevfile {
    #[serde(default)]
    schema_version: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    components: Vec<RawComponent>,
    #[serde(default)]
    commands: Vec<RawCommand>,
    #[serde(default)]
    events: RawEvents,
}

#[derive(Deserialize, Debug, Default)]
struct RawMetadata {
    name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawEvents {
    #[serde(default)]
    post_start: Vec<String>,
    #[serde(default)]
    pre_stop: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    kind: String,
    #[serde(default)]
    is_default: bool,
}

#[derive(Deserialize, Debug)]
struct RawEnvVar {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawExec {
    #[serde(default)]
    component: String,
    #[serde(default)]
    command_line: String,
    working_dir: Option<String>,
    #[serde(default)]
    env: Vec<RawEnvVar>,
    #[serde(default)]
    hot_reload_capable: bool,
    group: Option<RawGroup>,
}

#[derive(Deserialize, Debug)]
struct RawComposite {
    #[serde(default)]
    commands: Vec<String>,
    #[serde(default)]
    parallel: bool,
    group: Option<RawGroup>,
}

#[derive(Deserialize, Debug)]
struct RawApply {
    #[serde(default)]
    component: String,
    group: Option<RawGroup>,
}

#[derive(Deserialize, Debug)]
struct RawCommand {
    id: String,
    exec: Option<RawExec>,
    composite: Option<RawComposite>,
    apply: Option<RawApply>,
}

#[derive(Deserialize, Debug)]
struct RawContainer {
    #[serde(default)]
    image: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawDockerfile {
    uri: Option<String>,
    build_context: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawImage {
    image_name: String,
    dockerfile: Option<RawDockerfile>,
}

#[derive(Deserialize, Debug)]
struct RawManifest {
    uri: Option<String>,
    inlined: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawComponent {
    name: String,
    container: Option<RawContainer>,
    image: Option<RawImage>,
    kubernetes: Option<RawManifest>,
    openshift: Option<RawManifest>,
    volume: Option<serde_yaml::Value>,
}

fn devfile_error(message: String) -> anyhow::Error {
    anyhow!(DevloopError::Devfile(message))
}

fn convert_group(owner: &str, group: Option<RawGroup>) -> Result<Option<Group>> {
    let Some(group) = group else {
        return Ok(None);
    };
    let kind = match group.kind.to_lowercase().as_str() {
        "build" => CommandGroupKind::Build,
        "run" => CommandGroupKind::Run,
        "test" => CommandGroupKind::Test,
        "debug" => CommandGroupKind::Debug,
        "init" => CommandGroupKind::Init,
        other => {
            return Err(devfile_error(format!(
                "command \"{}\" has unsupported group kind \"{}\"",
                owner, other
            )))
        }
    };
    Ok(Some(Group::new(kind, group.is_default)))
}

fn convert_command(raw: RawCommand) -> Result<Command> {
    let id = raw.id;
    let (kind, group) = match (raw.exec, raw.composite, raw.apply) {
        (Some(exec), None, None) => (
            CommandKind::Exec(ExecCommand {
                component: exec.component,
                command_line: exec.command_line,
                working_dir: exec.working_dir,
                env: exec
                    .env
                    .into_iter()
                    .map(|v| EnvVar {
                        name: v.name,
                        value: v.value,
                    })
                    .collect(),
                hot_reload_capable: exec.hot_reload_capable,
            }),
            exec.group,
        ),
        (None, Some(composite), None) => (
            CommandKind::Composite(CompositeCommand {
                commands: composite.commands,
                parallel: composite.parallel,
            }),
            composite.group,
        ),
        (None, None, Some(apply)) => (
            CommandKind::Apply(ApplyCommand {
                component: apply.component,
            }),
            apply.group,
        ),
        _ => {
            return Err(devfile_error(format!(
                "command \"{}\" must define exactly one of exec, composite or apply",
                id
            )))
        }
    };
    let group = convert_group(&id, group)?;
    Ok(Command { id, group, kind })
}

fn convert_component(raw: RawComponent) -> Result<Component> {
    let name = raw.name;
    let kind = match (
        raw.container,
        raw.image,
        raw.kubernetes,
        raw.openshift,
        raw.volume,
    ) {
        (Some(container), None, None, None, None) => ComponentKind::Container(ContainerComponent {
            image: container.image,
        }),
        (None, Some(image), None, None, None) => {
            let (dockerfile, build_context) = match image.dockerfile {
                Some(d) => (d.uri, d.build_context),
                None => (None, None),
            };
            ComponentKind::Image(ImageComponent {
                image_name: image.image_name,
                dockerfile,
                build_context,
            })
        }
        (None, None, Some(manifest), None, None) => ComponentKind::Kubernetes(ManifestComponent {
            uri: manifest.uri,
            inlined: manifest.inlined,
        }),
        (None, None, None, Some(manifest), None) => ComponentKind::Openshift(ManifestComponent {
            uri: manifest.uri,
            inlined: manifest.inlined,
        }),
        (None, None, None, None, Some(_)) => ComponentKind::Volume,
        _ => {
            return Err(devfile_error(format!(
                "component \"{}\" must define exactly one of container, image, kubernetes, openshift or volume",
                name
            )))
        }
    };
    Ok(Component { name, kind })
}

/// Parses devfile YAML text.
pub fn parse_devfile(content: &str) -> Result<Devfile> {
    let raw: RawDevfile = serde_yaml::from_str(content)
        .map_err(|e| devfile_error(format!("invalid devfile YAML: {}", e)))?;
    if let Some(version) = &raw.schema_version {
        debug!("Devfile schema version {}", version);
    }

    let components = raw
        .components
        .into_iter()
        .map(convert_component)
        .collect::<Result<Vec<_>>>()?;
    let commands = raw
        .commands
        .into_iter()
        .map(convert_command)
        .collect::<Result<Vec<_>>>()?;
    let events = Events {
        post_start: raw.events.post_start,
        pre_stop: raw.events.pre_stop,
    };

    Ok(Devfile::new(raw.metadata.name, commands, components, events))
}

/// Reads and parses the devfile at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a devfile this reader
/// understands.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_devfile(path: &Path) -> Result<Devfile> {
    info!("Loading devfile from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read devfile: {}", path.display()))?;
    parse_devfile(&content).with_context(|| format!("Failed to load devfile: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NODE_DEVFILE: &str = r#"
schemaVersion: 2.2.0
metadata:
  name: nodejs-shop
starterProjects:
  - name: ignored
components:
  - name: Runtime
    container:
      image: registry.access.redhat.com/ubi8/nodejs-16:latest
      memoryLimit: 1024Mi
  - name: app-image
    image:
      imageName: shop/app:dev
      dockerfile:
        uri: docker/Dockerfile
        buildContext: .
  - name: cache
    volume:
      size: 1Gi
commands:
  - id: Install
    exec:
      component: Runtime
      commandLine: npm install
      workingDir: /projects
      env:
        - name: CI
          value: "true"
      group:
        kind: build
        isDefault: true
  - id: run
    exec:
      component: Runtime
      commandLine: npm start
      hotReloadCapable: true
      group:
        kind: run
  - id: build-image
    apply:
      component: app-image
  - id: all
    composite:
      commands: [Install, build-image]
      parallel: true
events:
  postStart: [Install]
"#;

    #[test]
    fn test_parse_full_devfile() {
        let devfile = parse_devfile(NODE_DEVFILE).unwrap();
        assert_eq!(devfile.name(), Some("nodejs-shop"));
        assert_eq!(devfile.list_components().len(), 3);
        assert_eq!(devfile.list_commands().len(), 4);

        let install = devfile.find_command("install").unwrap();
        assert_eq!(install.group, Some(Group::new(CommandGroupKind::Build, true)));
        let exec = install.as_exec().unwrap();
        assert_eq!(exec.component, "Runtime"); // component names keep their case
        assert_eq!(exec.working_dir.as_deref(), Some("/projects"));
        assert_eq!(exec.env[0].name, "CI");

        assert!(devfile.find_command("run").unwrap().is_hot_reload_capable());

        let all = devfile.find_command("all").unwrap().as_composite().unwrap();
        assert!(all.parallel);
        assert_eq!(all.commands, vec!["install", "build-image"]);

        assert_eq!(devfile.events().post_start, vec!["install"]);
        let component = |name: &str| {
            devfile
                .list_components()
                .iter()
                .find(|c| c.name == name)
                .unwrap()
        };
        assert!(component("app-image").is_applicable());
        assert_eq!(component("cache").type_name(), "volume");
    }

    #[test]
    fn test_command_needs_exactly_one_variant() {
        let yaml = r#"
commands:
  - id: broken
    exec:
      component: runtime
      commandLine: ls
    apply:
      component: image
"#;
        let err = parse_devfile(yaml).unwrap_err();
        assert!(err.to_string().contains("\"broken\""));

        let err = parse_devfile("commands:\n  - id: empty\n").unwrap_err();
        assert!(err.to_string().contains("exactly one of exec"));
    }

    #[test]
    fn test_component_needs_exactly_one_type() {
        let err = parse_devfile("components:\n  - name: nothing\n").unwrap_err();
        assert!(err.to_string().contains("\"nothing\""));
    }

    #[test]
    fn test_unknown_group_kind_rejected() {
        let yaml = r#"
commands:
  - id: ship
    exec:
      component: runtime
      commandLine: make deploy
      group:
        kind: deploy
"#;
        let err = parse_devfile(yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported group kind \"deploy\""));
    }

    #[test]
    fn test_invalid_yaml_is_devfile_error() {
        let err = parse_devfile("commands: [").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DevloopError>(),
            Some(DevloopError::Devfile(_))
        ));
    }

    #[test]
    fn test_load_devfile_from_disk() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("devfile.yaml");
        fs::write(&path, NODE_DEVFILE).unwrap();
        assert!(load_devfile(&path).is_ok());

        let missing = load_devfile(&temp_dir.path().join("nope.yaml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read devfile"));
    }
}
