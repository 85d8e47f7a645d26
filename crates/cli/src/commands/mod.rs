//! CLI definition and execution
//!
//! clap parses only the global flags. Everything from the first positional on
//! is handed to the command router in `clip-core`, which owns the collection
//! and subcommand registry.

use std::path::PathBuf;

use clap::Parser;
use clip_core::{
    ClientConfig, ConfigManager, Overrides, Plan, Result, dispatch, plan, route,
};
use clip_http::{ApiClient, DevToolsClient};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

pub mod help;

/// clip - command-line client for a local notes clipper API
///
/// Run `clip help` for the list of commands.
#[derive(Parser, Debug)]
#[command(name = "clip")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Notes API host
    #[arg(long, env = "CLIP_HOST")]
    pub host: Option<String>,

    /// Notes API port
    #[arg(long, env = "CLIP_PORT")]
    pub port: Option<u16>,

    /// API token
    #[arg(long, env = "CLIP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Chrome DevTools host
    #[arg(long, env = "CLIP_BROWSER_HOST")]
    pub browser_host: Option<String>,

    /// Chrome DevTools port
    #[arg(long, env = "CLIP_BROWSER_PORT")]
    pub browser_port: Option<u16>,

    /// Directory holding config.toml
    #[arg(long, env = "CLIP_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Disable progress spinner
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Command, subcommand, arguments and options
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            token: self.token.clone(),
            browser_host: self.browser_host.clone(),
            browser_port: self.browser_port,
        }
    }

    fn config_manager(&self) -> Result<ConfigManager> {
        match &self.config_dir {
            Some(dir) => Ok(ConfigManager::with_dir(dir.clone())),
            None => ConfigManager::new(),
        }
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };
    let formatter = Formatter::new(output_config);

    match run(&cli, output_config, &formatter).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

async fn run(cli: &Cli, output_config: OutputConfig, formatter: &Formatter) -> Result<()> {
    let command = route(&cli.args)?;
    let plan = plan(&command)?;

    if matches!(plan, Plan::Help) {
        formatter.text(&help::usage());
        return Ok(());
    }

    let settings = cli.config_manager()?.load()?;
    let config = ClientConfig::resolve(settings, cli.overrides());
    if command.collection.needs_credential() {
        config.credential()?;
    }

    let api = ApiClient::new(&config)?;
    let browser = DevToolsClient::new(&config.browser)?;

    let spinner = match &plan {
        Plan::Upload(upload) => Some(ProgressBar::spinner(
            output_config,
            &format!("Uploading {}", upload.file.display()),
        )),
        Plan::Download(download) => Some(ProgressBar::spinner(
            output_config,
            &format!("Downloading to {}", download.output.display()),
        )),
        _ => None,
    };

    let result = dispatch(plan, &api, &browser).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    formatter.output(&result?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_before_command() {
        let cli = Cli::try_parse_from([
            "clip", "--port", "5000", "--token", "t", "notes", "create", "--title", "T",
        ])
        .unwrap();
        assert_eq!(cli.port, Some(5000));
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert_eq!(cli.args, ["notes", "create", "--title", "T"]);
    }

    #[test]
    fn test_command_options_are_not_global_flags() {
        let cli = Cli::try_parse_from(["clip", "search", "rust", "--limit", "5", "--quiet"]).unwrap();
        assert!(!cli.quiet);
        assert_eq!(cli.args, ["search", "rust", "--limit", "5", "--quiet"]);
    }

    #[test]
    fn test_no_command_is_help() {
        let cli = Cli::try_parse_from(["clip"]).unwrap();
        assert!(cli.args.is_empty());
        assert_eq!(plan(&route(&cli.args).unwrap()).unwrap(), Plan::Help);
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::try_parse_from(["clip", "--browser-port", "9333", "browser", "tabs"]).unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.browser_port, Some(9333));
    }
}
