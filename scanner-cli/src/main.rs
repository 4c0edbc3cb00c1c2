mod cli;

use anyhow::Result;
use clap::Parser;
use cli::handlers;
use cli::settings::{resolve_settings, Overrides};
use scanner_core::services::logging::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scanner")]
#[command(version)]
#[command(about = "Route barcode scans from stdin to REST endpoints based on configurable modes")]
#[command(
    help_template = "{name} - {version}\n{about}\n\n{usage-heading}\n  {usage}\n\n{all-args}{options}\n"
)]
struct Cli {
    /// Directory containing mode definition files (*.yaml, *.yml)
    #[arg(long)]
    modes_dir: Option<PathBuf>,

    /// Mode active at startup and after an idle revert
    #[arg(long)]
    default_mode: Option<String>,

    /// Seconds without a scan before reverting to the default mode
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Request timeout in seconds for modes without their own timeout
    #[arg(long)]
    request_timeout: Option<u64>,

    /// Settings file (default: <config dir>/scanner/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also append log events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the loaded modes and exit
    #[arg(long)]
    list_modes: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        modes_dir: cli.modes_dir,
        default_mode: cli.default_mode,
        idle_timeout_seconds: cli.idle_timeout,
        request_timeout_seconds: cli.request_timeout,
        verbosity: cli.verbose,
    };
    let settings = resolve_settings(cli.config.as_deref(), overrides)?;

    init_logging(settings.log_level.unwrap_or_default(), cli.log_file.as_deref())?;

    if cli.list_modes {
        handlers::handle_list_modes(&settings)?;
    } else {
        handlers::handle_run(&settings).await?;
    }

    Ok(())
}
