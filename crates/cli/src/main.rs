//! settle - print a line stream's debounced values

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

/// Debounce stdin: print each line once it stays unchanged for the delay
#[derive(Parser)]
#[command(name = "settle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    #[command(flatten)]
    log: LogArgs,
}

/// Options for the default (run) mode
#[derive(Args)]
pub(crate) struct RunArgs {
    /// Config file (default: <config dir>/settle/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quiet period in milliseconds (default: 300)
    #[arg(short, long, allow_negative_numbers = true)]
    delay_ms: Option<i64>,

    /// Update-cycle period in milliseconds (default: 50)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Exit on EOF without waiting for the last line to settle
    #[arg(long)]
    no_drain: bool,
}

/// Logging options
#[derive(Args)]
pub(crate) struct LogArgs {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the default config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print a commented example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cmd::run::run(cli.run, cli.log).await,
        Some(Commands::Config(config_cmd)) => match config_cmd {
            ConfigCommands::Show => cmd::config::run_show(cli.run.config.as_deref()).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
