//! clip - command-line client for a local notes clipper API
//!
//! Talks to the notes service's REST API and to Chrome DevTools. Prints JSON
//! on stdout, JSON errors on stderr, and exits with a code per error kind.

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use clip_cli::commands::{self, Cli};
use clip_cli::exit_code::ExitCode;
use clip_cli::output::formatter::render_error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // A closed stdout leaves nothing to report to
            e.print().ok();
            std::process::exit(ExitCode::Success.as_i32());
        }
        Err(e) => {
            eprintln!("{}", render_error(e.to_string().trim()));
            std::process::exit(ExitCode::UsageError.as_i32());
        }
    };

    init_tracing(cli.debug);

    let exit_code = commands::execute(cli).await;
    std::process::exit(exit_code.as_i32());
}

/// Logs go to stderr; stdout carries only JSON
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
