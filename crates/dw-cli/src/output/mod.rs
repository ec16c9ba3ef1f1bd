//! Output formatting utilities for the CLI
//!
//! The status table goes to stdout once per poll cycle. Everything else
//! (progress messages, errors) goes to stderr, either through `tracing` or
//! through the coloured `print_*` helpers below.

use std::io::Write;

use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use dw_core::{format_age, UnitTable};

/// Where the status table is rendered after every cycle
pub trait DisplaySink {
    fn render(&mut self, units: &UnitTable);
}

/// Layout of the status table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per challenge: `<poll id> <name>: <status> for <N.N> seconds`
    #[default]
    Plain,
    /// Bordered table with an error column
    Table,
}

/// Writes each frame to stdout
#[derive(Debug, Default)]
pub struct StdoutSink {
    format: OutputFormat,
}

impl StdoutSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl DisplaySink for StdoutSink {
    fn render(&mut self, units: &UnitTable) {
        let frame = match self.format {
            OutputFormat::Plain => format_units_plain(units),
            OutputFormat::Table => format_units_table(units),
        };

        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "\n{}", frame).and_then(|_| stdout.flush()) {
            tracing::warn!("Failed to write status table: {}", e);
        }
    }
}

/// Format the units as plain lines, in input order.
///
/// ```text
/// Update:
/// 3f0c...      pwn-intro:  building for 12.0 seconds
/// -             web-login: Not started
///
/// ```
pub fn format_units_plain(units: &UnitTable) -> String {
    let mut output = String::from("Update:\n");

    for unit in units.iter() {
        let poll_id = unit
            .poll_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{} {:>16}: {}\n",
            poll_id,
            unit.name,
            unit.status_line()
        ));
    }

    output.push('\n');
    output
}

/// Format the units as an ASCII table
pub fn format_units_table(units: &UnitTable) -> String {
    #[derive(Tabled)]
    struct UnitRow {
        #[tabled(rename = "POLL ID")]
        poll_id: String,
        #[tabled(rename = "CHALLENGE")]
        name: String,
        #[tabled(rename = "STATUS")]
        status: String,
        #[tabled(rename = "AGE")]
        age: String,
        #[tabled(rename = "LAST ERROR")]
        error: String,
    }

    let rows: Vec<UnitRow> = units
        .iter()
        .map(|u| UnitRow {
            poll_id: u
                .poll_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            name: u.name.clone(),
            status: u.status.clone(),
            age: u
                .status_age
                .map(|age| format!("{}s", format_age(age)))
                .unwrap_or_else(|| "-".to_string()),
            error: u.last_error.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(120))
        .to_string()
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
