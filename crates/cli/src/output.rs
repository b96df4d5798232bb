//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use expense_tracker_core::validation::{ValidationError, ValidationResult};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `label: value` line
    pub fn field(label: &str, value: &str) {
        println!("  {:<20} {}", format!("{}:", label).dimmed(), value);
    }
}

/// Print every error and warning of a validation result
pub fn print_diagnostics(result: &ValidationResult) {
    for error in result.errors() {
        Status::error(&format_diagnostic(error));
    }
    for warning in result.warnings() {
        Status::warning(&format_diagnostic(warning));
    }
}

/// `[CODE] field: message (expected ..., found ...)`
pub fn format_diagnostic(diagnostic: &ValidationError) -> String {
    let mut line = format!(
        "[{}] {}: {}",
        diagnostic.code, diagnostic.field, diagnostic.message
    );
    match (&diagnostic.expected, &diagnostic.actual) {
        (Some(expected), Some(actual)) => {
            line.push_str(&format!(" (expected {}, found {})", expected, actual));
        }
        (None, Some(actual)) => line.push_str(&format!(" (found {})", actual)),
        (Some(expected), None) => line.push_str(&format!(" (expected {})", expected)),
        (None, None) => {}
    }
    line
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
