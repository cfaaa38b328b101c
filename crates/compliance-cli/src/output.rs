//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// A labelled value shown as one table row.
#[derive(Debug, Serialize, Tabled)]
pub struct Field {
    /// Label
    #[tabled(rename = "Field")]
    pub name: &'static str,
    /// Rendered value
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Field {
    /// Create a row; absent values render as `-`.
    pub fn new(name: &'static str, value: Option<impl ToString>) -> Self {
        Self {
            name,
            value: value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Print a record: as a two-column table, or as the JSON of `item`.
pub fn print_record<T: Serialize>(item: &T, fields: &[Field], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new(fields);
            table.with(Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => print_json(item),
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
