//! aws-aliased-profiles
//!
//! Populates `~/.aws/config` with one profile per account of an AWS
//! Organization, named after the account alias.
//!
//! Workflow:
//! - `init`: place the default profile template
//! - `fetch <profile> <account-role>`: discover accounts into `state.json`
//! - `upsert`: render the template for every account into `~/.aws/config`

mod commands;
mod config;
mod render;
mod splice;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::Config;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "aws_aliased_profiles=warn,aliased_fetch=warn,aliased_client=warn";
const VERBOSE_LOG_FILTER: &str = "aws_aliased_profiles=debug,aliased_fetch=debug,aliased_client=debug";

#[derive(Parser)]
#[command(name = "aws-aliased-profiles")]
#[command(about = "Quickly update your AWS config with all your organization accounts' aliases", long_about = None)]
struct Cli {
    /// Directory holding `.aws` (defaults to the user's home directory)
    #[arg(long, global = true, env = "AWS_ALIASED_PROFILES_HOME")]
    home: Option<PathBuf>,

    /// Log per-account detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match Config::new(cli.home) {
        Ok(config) => handle_command(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                error_line(&format!("{:#}", e), std::io::stderr().is_terminal())
            );
            ExitCode::FAILURE
        }
    }
}

/// The final error message, coloured only for a terminal
fn error_line(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "error:".red().bold(), message)
    } else {
        format!("error: {}", message)
    }
}

/// Logs go to stderr so the progress counters on stdout stay readable
fn init_logging(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
