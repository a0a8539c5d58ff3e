//! # Devfile Command Document Model
//!
//! File: cli/src/devfile/model.rs
//!
//! ## Overview
//!
//! The read-only snapshot of a devfile that the rest of the engine consumes:
//! its commands, its components and its lifecycle events. A `Devfile` is
//! built once per invocation (by `loader`, or directly in tests) and is never
//! mutated afterwards.
//!
//! Command ids and composite references are lower-cased exactly once, in
//! `Devfile::new`. Every lookup after that goes through `normalize_id`, so a
//! command declared as `Build1` is found as `build1` or `BUILD1`.
//!
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle phase a command serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandGroupKind {
    Build,
    Run,
    Test,
    Debug,
    Init,
}

impl CommandGroupKind {
    /// All kinds, in the order they are reported by `devloop validate`.
    pub const ALL: [CommandGroupKind; 5] = [
        CommandGroupKind::Init,
        CommandGroupKind::Build,
        CommandGroupKind::Run,
        CommandGroupKind::Test,
        CommandGroupKind::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandGroupKind::Build => "build",
            CommandGroupKind::Run => "run",
            CommandGroupKind::Test => "test",
            CommandGroupKind::Debug => "debug",
            CommandGroupKind::Init => "init",
        }
    }
}

impl fmt::Display for CommandGroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group membership of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub kind: CommandGroupKind,
    pub is_default: bool,
}

impl Group {
    pub fn new(kind: CommandGroupKind, is_default: bool) -> Self {
        Self { kind, is_default }
    }
}

/// A single environment variable assignment on an exec command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// A shell command run inside a container component.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecCommand {
    pub component: String,
    pub command_line: String,
    pub working_dir: Option<String>,
    pub env: Vec<EnvVar>,
    pub hot_reload_capable: bool,
}

/// An ordered (or parallel) list of references to other commands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositeCommand {
    pub commands: Vec<String>,
    pub parallel: bool,
}

/// Applies a non-container component (image build, Kubernetes manifest).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyCommand {
    pub component: String,
}

/// The three command variants of a devfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Exec(ExecCommand),
    Composite(CompositeCommand),
    Apply(ApplyCommand),
}

/// A named devfile command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: String,
    pub group: Option<Group>,
    pub kind: CommandKind,
}

// Shorthand constructors for tests; the loader builds commands from YAML.
#[cfg(test)]
impl Command {
    pub fn exec(id: impl Into<String>, exec: ExecCommand) -> Self {
        Self {
            id: id.into(),
            group: None,
            kind: CommandKind::Exec(exec),
        }
    }

    pub fn composite(id: impl Into<String>, commands: &[&str], parallel: bool) -> Self {
        Self {
            id: id.into(),
            group: None,
            kind: CommandKind::Composite(CompositeCommand {
                commands: commands.iter().map(|c| c.to_string()).collect(),
                parallel,
            }),
        }
    }

    pub fn apply(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: None,
            kind: CommandKind::Apply(ApplyCommand {
                component: component.into(),
            }),
        }
    }

    /// Builder-style group assignment.
    pub fn with_group(mut self, kind: CommandGroupKind, is_default: bool) -> Self {
        self.group = Some(Group::new(kind, is_default));
        self
    }
}

impl Command {
    pub fn group_kind(&self) -> Option<CommandGroupKind> {
        self.group.map(|g| g.kind)
    }

    pub fn is_default(&self) -> bool {
        self.group.is_some_and(|g| g.is_default)
    }

    pub fn as_exec(&self) -> Option<&ExecCommand> {
        match &self.kind {
            CommandKind::Exec(exec) => Some(exec),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeCommand> {
        match &self.kind {
            CommandKind::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Only exec commands can declare themselves hot-reload capable.
    pub fn is_hot_reload_capable(&self) -> bool {
        self.as_exec().is_some_and(|e| e.hot_reload_capable)
    }

    /// Short variant label used in listings.
    pub fn variant_name(&self) -> &'static str {
        match self.kind {
            CommandKind::Exec(_) => "exec",
            CommandKind::Composite(CompositeCommand { parallel: true, .. }) => "composite (parallel)",
            CommandKind::Composite(_) => "composite",
            CommandKind::Apply(_) => "apply",
        }
    }
}

/// Container component settings the engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerComponent {
    pub image: String,
}

/// Image component: an image built from a Dockerfile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageComponent {
    pub image_name: String,
    pub dockerfile: Option<String>,
    pub build_context: Option<String>,
}

/// Kubernetes or OpenShift manifest, referenced or inlined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestComponent {
    pub uri: Option<String>,
    pub inlined: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    Container(ContainerComponent),
    Image(ImageComponent),
    Kubernetes(ManifestComponent),
    Openshift(ManifestComponent),
    Volume,
}

/// A named devfile component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub kind: ComponentKind,
}

#[cfg(test)]
impl Component {
    pub fn container(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Container(ContainerComponent {
                image: image.into(),
            }),
        }
    }
}

impl Component {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ComponentKind::Container(_))
    }

    /// Image, Kubernetes and OpenShift components are targets of apply commands.
    pub fn is_applicable(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::Image(_) | ComponentKind::Kubernetes(_) | ComponentKind::Openshift(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ComponentKind::Container(_) => "container",
            ComponentKind::Image(_) => "image",
            ComponentKind::Kubernetes(_) => "kubernetes",
            ComponentKind::Openshift(_) => "openshift",
            ComponentKind::Volume => "volume",
        }
    }
}

/// Devfile lifecycle events, each a list of command ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Events {
    pub post_start: Vec<String>,
    pub pre_stop: Vec<String>,
}

/// Lookup table from normalized command id to command.
pub type CommandMap<'a> = HashMap<String, &'a Command>;

/// Case-folds a command id or reference.
pub fn normalize_id(id: &str) -> String {
    id.to_lowercase()
}

/// Builds a case-insensitive id lookup. On duplicate ids the first command wins;
/// duplicates are reported by `validate::validate_all`.
pub fn commands_map(commands: &[Command]) -> CommandMap<'_> {
    let mut map = HashMap::with_capacity(commands.len());
    for command in commands {
        map.entry(normalize_id(&command.id)).or_insert(command);
    }
    map
}

/// Immutable, already-normalized devfile snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Devfile {
    name: Option<String>,
    commands: Vec<Command>,
    components: Vec<Component>,
    events: Events,
}

impl Devfile {
    /// Creates the snapshot, lower-casing command ids, composite references
    /// and event command references.
    pub fn new(
        name: Option<String>,
        commands: Vec<Command>,
        components: Vec<Component>,
        events: Events,
    ) -> Self {
        let commands = commands
            .into_iter()
            .map(|mut command| {
                command.id = normalize_id(&command.id);
                if let CommandKind::Composite(composite) = &mut command.kind {
                    for reference in composite.commands.iter_mut() {
                        *reference = normalize_id(reference);
                    }
                }
                command
            })
            .collect();
        let events = Events {
            post_start: events.post_start.iter().map(|e| normalize_id(e)).collect(),
            pre_stop: events.pre_stop.iter().map(|e| normalize_id(e)).collect(),
        };
        Self {
            name,
            commands,
            components,
            events,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn list_commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn list_components(&self) -> &[Component] {
        &self.components
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn commands_map(&self) -> CommandMap<'_> {
        commands_map(&self.commands)
    }

    pub fn find_command(&self, id: &str) -> Option<&Command> {
        let wanted = normalize_id(id);
        self.commands.iter().find(|c| c.id == wanted)
    }
}
