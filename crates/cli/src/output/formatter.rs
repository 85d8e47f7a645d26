//! Output formatter
//!
//! Ensures consistent output across all commands.

use serde::Serialize;
use serde_json::json;

use super::OutputConfig;

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Print a result as indented JSON on stdout
    pub fn output<T: Serialize>(&self, value: &T) {
        if self.config.quiet {
            return;
        }

        match render_output(value) {
            Ok(text) => println!("{text}"),
            Err(e) => self.error(&format!("Error serializing output: {e}")),
        }
    }

    /// Print a plain text block on stdout (respects quiet mode)
    pub fn text(&self, text: &str) {
        if !self.config.quiet {
            println!("{text}");
        }
    }

    /// Print an error as single-line JSON on stderr
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}", render_error(message));
    }
}

/// Indented JSON for a result value
pub fn render_output<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Single-line `{"error": ...}` document
pub fn render_error(message: &str) -> String {
    json!({ "error": message }).to_string()
}
