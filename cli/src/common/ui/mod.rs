//! # Devloop UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Everything Devloop prints for the user goes through this module, so that
//! `-o json` can swap human-readable lines for one JSON object per line.
//!
//! ## Architecture
//!
//! - **`OutputFormat`**: the `-o/--output` value (`human` or `json`).
//! - **`Output`**: small helper that prints status lines, tables and errors in
//!   the selected format.
//! - **`events`**: the machine-readable event records (`devFileCommandExecutionBegin`,
//!   `logText`, ...) emitted while commands run.
//!
//! Diagnostics still go to `tracing` on stderr; this module is for results.
//!
use serde::Serialize;

pub mod events;

/// Output format selected with `-o/--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Output helper for consistent formatting.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a success message.
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "success": true, "message": message })
            ),
        }
    }

    /// Prints a progress line. Human mode only; JSON consumers follow the events.
    pub fn status(&self, message: &str) {
        if self.format == OutputFormat::Human {
            println!("• {}", message);
        }
    }

    /// Prints structured data. Human mode falls back to pretty JSON.
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = match self.format {
            OutputFormat::Human => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    /// Prints aligned columns (human only).
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if self.format != OutputFormat::Human {
            return;
        }
        print!("{}", render_table(headers, rows));
    }
}

/// Left-aligned columns separated by two spaces, header first.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render_row = |cells: Vec<&str>| -> String {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        format!("{}\n", line.join("  ").trim_end())
    };

    let mut out = render_row(headers.to_vec());
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str).collect()));
    }
    out
}
