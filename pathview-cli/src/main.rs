//! PathView CLI - Command-line interface
//!
//! Drives a tracking session from the terminal: a simulated walk toward the
//! configured destination, printed as the camera moves a map would make.

mod commands;
mod error;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use commands::common::Overrides;
use commands::config::ConfigCommands;
use commands::run::RunArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "pathview")]
#[command(version = pathview::VERSION)]
#[command(about = "Live position tracking and camera control toward a fixed destination", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tracking session with a simulated walk
    Run {
        /// Config file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,

        /// Destination latitude
        #[arg(long, allow_hyphen_values = true)]
        dest_lat: Option<f64>,

        /// Destination longitude
        #[arg(long, allow_hyphen_values = true)]
        dest_lon: Option<f64>,

        /// Routing provider API key (overrides config and environment)
        #[arg(long)]
        api_key: Option<String>,

        /// Minimum interval between position samples in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Simulated walking speed in metres per second
        #[arg(long)]
        speed: Option<f64>,

        /// Log level filter (e.g. info, debug, pathview=trace)
        #[arg(long)]
        log_level: Option<String>,

        /// Print surface events as JSON lines
        #[arg(long)]
        json: bool,

        /// Grant location access without prompting
        #[arg(short = 'y', long, conflicts_with = "deny_location")]
        yes: bool,

        /// Deny location access without prompting
        #[arg(long)]
        deny_location: bool,

        /// Mirror log output to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            dest_lat,
            dest_lon,
            api_key,
            interval_ms,
            speed,
            log_level,
            json,
            yes,
            deny_location,
            verbose,
        } => commands::run::run(RunArgs {
            overrides: Overrides {
                config_path: config,
                dest_lat,
                dest_lon,
                api_key,
                interval_ms,
                speed_mps: speed,
                log_level,
            },
            json,
            grant_location: yes,
            deny_location,
            verbose,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

fn report(error: &CliError) {
    eprintln!("{} {}", style("Error:").red().bold(), error);
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}
