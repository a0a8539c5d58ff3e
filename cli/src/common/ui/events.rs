//! # Machine-Readable Events
//!
//! File: cli/src/common/ui/events.rs
//!
//! ## Overview
//!
//! With `-o json` every execution step is printed as one JSON object per line,
//! keyed by the event name:
//!
//! ```json
//! {"devFileCommandExecutionBegin":{"commandId":"run","componentName":"runtime","commandLine":"npm start","groupKind":"run","timestamp":"1700000000.000042"}}
//! {"logText":{"text":"listening on :3000","stream":"stdout","timestamp":"1700000000.512001"}}
//! {"devFileCommandExecutionComplete":{"commandId":"run",...,"error":""}}
//! ```
//!
use crate::devfile::executor::{timestamp_now, ExecutionEvent};
use serde::Serialize;
use std::io::Write;

/// The payload shared by begin and complete events.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandEvent {
    pub command_id: String,
    pub component_name: String,
    pub command_line: String,
    pub group_kind: String,
    pub timestamp: String,
}

impl From<&ExecutionEvent> for CommandEvent {
    fn from(event: &ExecutionEvent) -> Self {
        Self {
            command_id: event.command_id.clone(),
            component_name: event.component.clone(),
            command_line: event.command_line.clone(),
            group_kind: event.group.map(|g| g.to_string()).unwrap_or_default(),
            timestamp: event.timestamp.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandCompleteEvent {
    #[serde(flatten)]
    pub command: CommandEvent,
    /// Empty on success.
    pub error: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LogTextEvent {
    pub text: String,
    pub stream: String,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub error: String,
    pub timestamp: String,
}

/// One line of machine-readable output.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MachineEvent {
    DevFileCommandExecutionBegin(CommandEvent),
    DevFileCommandExecutionComplete(CommandCompleteEvent),
    LogText(LogTextEvent),
    ReportError(ErrorEvent),
}

impl MachineEvent {
    pub fn begin(event: &ExecutionEvent) -> Self {
        MachineEvent::DevFileCommandExecutionBegin(event.into())
    }

    pub fn complete(event: &ExecutionEvent, error: Option<&anyhow::Error>) -> Self {
        MachineEvent::DevFileCommandExecutionComplete(CommandCompleteEvent {
            command: event.into(),
            error: error.map(|e| format!("{:#}", e)).unwrap_or_default(),
        })
    }

    pub fn log_text(text: &str, stream: &str) -> Self {
        MachineEvent::LogText(LogTextEvent {
            text: text.to_string(),
            stream: stream.to_string(),
            timestamp: timestamp_now(),
        })
    }

    pub fn report_error(error: &anyhow::Error) -> Self {
        MachineEvent::ReportError(ErrorEvent {
            error: format!("{:#}", error),
            timestamp: timestamp_now(),
        })
    }

    pub fn to_json_line(&self) -> String {
        // Plain strings and maps only; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Writes the event as one line on stdout.
    pub fn emit(&self) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", self.to_json_line());
        let _ = stdout.flush();
    }
}
