//! # Docker Command Executor
//!
//! File: cli/src/common/docker/executor.rs
//!
//! ## Overview
//!
//! `DockerExecutor` is the production `CommandExecutor`: devfile commands run
//! through `docker exec` in the container that backs their component, image
//! components are built with the Docker build API, and execution events are
//! printed for the user (or as JSON with `-o json`).
//!
//! ## Architecture
//!
//! - **Container naming**: `containers.overrides[component]`, otherwise
//!   `containers.name_template` with `{project}` and `{component}` filled in.
//! - **Exec**: `interaction::exec_in_container`. A non-zero exit code becomes
//!   `DevloopError::ExternalCommand`, carrying the captured output when the
//!   output was not shown.
//! - **Apply**: `image` components are built from their Dockerfile. Paths in
//!   the devfile are relative to the devfile's directory. Kubernetes and
//!   OpenShift components cannot be applied against a plain Docker daemon.
//!
use crate::common::ui::events::MachineEvent;
use crate::common::ui::{Output, OutputFormat};
use crate::core::config::Config;
use crate::core::error::{DevloopError, Result};
use crate::devfile::executor::{CommandExecutor, ComponentInfo, ExecOptions, ExecutionEvent};
use crate::devfile::model::{Command, CommandKind, Component, ComponentKind, ImageComponent};
use anyhow::anyhow;
use async_trait::async_trait;
use std::path::{Component as PathComponent, Path, PathBuf};
use tracing::{debug, info};

use super::interaction::{exec_in_container, OutputMode};
use super::operations::build_image;

const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Runs devfile commands against local Docker containers.
#[derive(Debug, Clone)]
pub struct DockerExecutor {
    project: String,
    config: Config,
    components: Vec<Component>,
    devfile_dir: PathBuf,
    output: Output,
}

impl DockerExecutor {
    pub fn new(
        project: impl Into<String>,
        config: Config,
        components: Vec<Component>,
        devfile_dir: PathBuf,
        format: OutputFormat,
    ) -> Self {
        Self {
            project: project.into(),
            config,
            components,
            devfile_dir,
            output: Output::new(format),
        }
    }

    /// Container backing a container component.
    pub fn component_info(&self, component: &str) -> Result<ComponentInfo> {
        match self.components.iter().find(|c| c.name == component) {
            Some(c) if c.is_container() => Ok(ComponentInfo {
                component_name: component.to_string(),
                container_name: self.config.containers.container_name(&self.project, component),
            }),
            Some(c) => Err(anyhow!(DevloopError::Docker(format!(
                "component \"{}\" is a {} component, not a container",
                component,
                c.type_name()
            )))),
            None => Err(anyhow!(DevloopError::Docker(format!(
                "component \"{}\" is not defined in the devfile",
                component
            )))),
        }
    }

    /// Names excluded from image build contexts: VCS metadata and the state directory.
    fn context_exclusions(&self) -> Vec<String> {
        let mut excluded = vec![".git".to_string()];
        if let Some(name) = Path::new(&self.config.project.state_dir).file_name() {
            excluded.push(name.to_string_lossy().into_owned());
        }
        excluded
    }

    async fn apply_image(&self, component: &str, image: &ImageComponent) -> Result<()> {
        let (context_dir, dockerfile) = image_build_paths(&self.devfile_dir, image)?;
        info!(
            "Building image '{}' for component '{}' from {}",
            image.image_name,
            component,
            context_dir.display()
        );
        self.output.status(&format!(
            "Building image {} for component {}",
            image.image_name, component
        ));

        let excluded = self.context_exclusions();
        let excluded: Vec<&str> = excluded.iter().map(String::as_str).collect();
        build_image(
            &image.image_name,
            &dockerfile,
            &context_dir,
            &excluded,
            OutputMode::select(self.output.format(), true),
        )
        .await
    }
}

/// Resolves the build context directory and the Dockerfile path inside it.
///
/// `buildContext` and `dockerfile.uri` are relative to the devfile's directory
/// (absolute paths are used as-is). The Dockerfile must be inside the context.
pub fn image_build_paths(devfile_dir: &Path, image: &ImageComponent) -> Result<(PathBuf, String)> {
    let context_dir = normalize(&devfile_dir.join(image.build_context.as_deref().unwrap_or(".")));
    let dockerfile = match image.dockerfile.as_deref() {
        None => return Ok((context_dir, DEFAULT_DOCKERFILE.to_string())),
        Some(uri) => normalize(&devfile_dir.join(uri)),
    };
    let relative = dockerfile.strip_prefix(&context_dir).map_err(|_| {
        anyhow!(DevloopError::Apply {
            component: image.image_name.clone(),
            reason: format!(
                "Dockerfile '{}' is outside the build context '{}'",
                dockerfile.display(),
                context_dir.display()
            ),
        })
    })?;
    Ok((context_dir, relative.to_string_lossy().replace('\\', "/")))
}

/// Lexically removes `.` and `..` segments.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            PathComponent::CurDir => {}
            PathComponent::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[async_trait]
impl CommandExecutor for DockerExecutor {
    async fn exec_in_target(
        &self,
        target: &ComponentInfo,
        argv: &[String],
        options: ExecOptions,
    ) -> Result<()> {
        let mode = OutputMode::select(self.output.format(), options.show);
        let outcome = exec_in_container(&target.container_name, argv, options, mode).await?;
        if outcome.exit_code != 0 {
            return Err(anyhow!(DevloopError::ExternalCommand {
                cmd: argv.join(" "),
                status: format!("exit code {}", outcome.exit_code),
                output: outcome.output,
            }));
        }
        Ok(())
    }

    fn resolve_component_info(&self, command: &Command) -> Result<ComponentInfo> {
        match &command.kind {
            CommandKind::Exec(exec) => self.component_info(&exec.component),
            CommandKind::Apply(apply) => Ok(ComponentInfo {
                component_name: apply.component.clone(),
                container_name: String::new(),
            }),
            CommandKind::Composite(_) => Err(anyhow!(DevloopError::Docker(format!(
                "composite command \"{}\" does not target a single component",
                command.id
            )))),
        }
    }

    fn resolve_supervisor_component_info(&self, command: &Command) -> Result<ComponentInfo> {
        match command.as_exec() {
            Some(exec) => self.component_info(&exec.component),
            None => Err(anyhow!(DevloopError::Docker(format!(
                "command \"{}\" is a {} command; the supervisor can only run exec commands",
                command.id,
                command.variant_name()
            )))),
        }
    }

    async fn apply_component(&self, component: &str) -> Result<()> {
        let found = self
            .components
            .iter()
            .find(|c| c.name == component)
            .ok_or_else(|| {
                anyhow!(DevloopError::Apply {
                    component: component.to_string(),
                    reason: "component is not defined in the devfile".into(),
                })
            })?;
        match &found.kind {
            ComponentKind::Image(image) => self.apply_image(component, image).await,
            ComponentKind::Kubernetes(_) | ComponentKind::Openshift(_) => {
                Err(anyhow!(DevloopError::Apply {
                    component: component.to_string(),
                    reason: format!(
                        "{} components are not supported by the Docker executor",
                        found.type_name()
                    ),
                }))
            }
            ComponentKind::Container(_) | ComponentKind::Volume => {
                Err(anyhow!(DevloopError::Apply {
                    component: component.to_string(),
                    reason: format!("{} components cannot be applied", found.type_name()),
                }))
            }
        }
    }

    fn report_execution_begin(&self, event: &ExecutionEvent) {
        debug!("Begin '{}' at {}", event.command_id, event.timestamp);
        match self.output.format() {
            OutputFormat::Json => MachineEvent::begin(event).emit(),
            OutputFormat::Human => self.output.status(&format!(
                "Executing {} command \"{}\"",
                event.command_id, event.command_line
            )),
        }
    }

    fn report_execution_complete(&self, event: &ExecutionEvent, error: Option<&anyhow::Error>) {
        debug!(
            "Complete '{}' at {} (failed: {})",
            event.command_id,
            event.timestamp,
            error.is_some()
        );
        match self.output.format() {
            OutputFormat::Json => MachineEvent::complete(event, error).emit(),
            // Failures are printed once, by the caller.
            OutputFormat::Human if error.is_none() => self
                .output
                .success(&format!("Finished {} command", event.command_id)),
            OutputFormat::Human => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devfile::model::ManifestComponent;

    fn executor() -> DockerExecutor {
        let mut config = Config::default();
        config
            .containers
            .overrides
            .insert("db".into(), "postgres-dev".into());
        DockerExecutor::new(
            "shop",
            config,
            vec![
                Component::container("runtime", "node:20"),
                Component::container("db", "postgres:16"),
                Component {
                    name: "manifests".into(),
                    kind: ComponentKind::Kubernetes(ManifestComponent {
                        uri: Some("k8s/deploy.yaml".into()),
                        inlined: None,
                    }),
                },
            ],
            PathBuf::from("/work/shop"),
            OutputFormat::Human,
        )
    }

    #[test]
    fn test_container_naming() {
        let exec = executor();
        assert_eq!(
            exec.component_info("runtime").unwrap().container_name,
            "shop-runtime"
        );
        assert_eq!(exec.component_info("db").unwrap().container_name, "postgres-dev");
        assert!(exec.component_info("manifests").is_err());
        assert!(exec.component_info("ghost").is_err());
    }

    #[test]
    fn test_composite_has_no_component() {
        let exec = executor();
        let composite = Command::composite("all", &["a", "b"], false);
        assert!(exec.resolve_component_info(&composite).is_err());
        assert!(exec.resolve_supervisor_component_info(&composite).is_err());
    }

    #[tokio::test]
    async fn test_manifest_apply_is_unsupported() {
        let err = executor().apply_component("manifests").await.unwrap_err();
        assert!(err.to_string().contains("not supported by the Docker executor"));
        let err = executor().apply_component("runtime").await.unwrap_err();
        assert!(err.to_string().contains("cannot be applied"));
    }

    #[test]
    fn test_image_build_paths() {
        let dir = Path::new("/work/shop");

        let defaults = ImageComponent {
            image_name: "shop/app".into(),
            ..Default::default()
        };
        assert_eq!(
            image_build_paths(dir, &defaults).unwrap(),
            (PathBuf::from("/work/shop"), "Dockerfile".to_string())
        );

        let nested = ImageComponent {
            image_name: "shop/app".into(),
            dockerfile: Some("./docker/Dockerfile.dev".into()),
            build_context: Some(".".into()),
        };
        assert_eq!(
            image_build_paths(dir, &nested).unwrap(),
            (PathBuf::from("/work/shop"), "docker/Dockerfile.dev".to_string())
        );

        let outside = ImageComponent {
            image_name: "shop/app".into(),
            dockerfile: Some("../Dockerfile".into()),
            build_context: Some("app".into()),
        };
        assert!(image_build_paths(dir, &outside).is_err());
    }

    #[test]
    fn test_context_exclusions() {
        assert_eq!(executor().context_exclusions(), vec![".git", ".devloop"]);
    }
}
