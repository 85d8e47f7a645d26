//! Output formatting utilities
//!
//! Results go to stdout as indented JSON; errors and progress go to stderr so
//! stdout can be piped straight into `jq`.

pub mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Disable progress spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
