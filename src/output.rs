//! Rendering of command results as tables, JSON, or status lines.

use std::fmt;

use serde::Serialize;
use tabled::{Table, Tabled};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables and labelled fields.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Severity marker prefixed to a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Done,
    Warn,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Done => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
        })
    }
}

fn status_line(status: Status, msg: &str) -> String {
    format!("{status} {msg}")
}

fn to_json<T: Serialize + ?Sized>(value: &T, empty: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize output");
        empty.to_string()
    })
}

/// Rows as a table, or a JSON array.
pub fn render_rows<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> String {
    match (format, rows.is_empty()) {
        (OutputFormat::Json, _) => to_json(rows, "[]"),
        (OutputFormat::Table, true) => "Nothing to show.".to_string(),
        (OutputFormat::Table, false) => Table::new(rows).to_string(),
    }
}

/// Labelled field line used in table mode.
pub fn render_field(label: &str, value: &str) -> String {
    format!("  {:<24} {value}", format!("{label}:"))
}

pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    println!("{}", render_rows(rows, format));
}

/// Prints `item` as JSON, or hands it to `table` for the human layout.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat, table: impl FnOnce(&T)) {
    match format {
        OutputFormat::Json => println!("{}", to_json(item, "{}")),
        OutputFormat::Table => table(item),
    }
}

pub fn field(label: &str, value: &str) {
    println!("{}", render_field(label, value));
}

pub fn done(msg: &str) {
    println!("{}", status_line(Status::Done, msg));
}

pub fn warn(msg: &str) {
    println!("{}", status_line(Status::Warn, msg));
}

/// Written to stderr so JSON on stdout stays parseable.
pub fn fail(msg: &str) {
    eprintln!("{}", status_line(Status::Fail, msg));
}
