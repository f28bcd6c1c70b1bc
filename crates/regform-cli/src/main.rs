mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "regform")]
#[command(version, about = "Check registration records against the regform schema", long_about = None)]
struct Cli {
    /// Log validation steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON record and print the confirmation or the field errors
    Validate {
        /// JSON object mapping field names to strings (or null)
        record: PathBuf,

        /// Configuration file (defaults to ./regform.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the schema's fields with their kinds and rules
    Fields {
        /// Configuration file (defaults to ./regform.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "regform=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries the confirmation; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Validate { record, config } => {
            let config = commands::load_config(config.as_deref())?;
            if commands::validate::execute(&record, &config)? {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Fields { config } => {
            let config = commands::load_config(config.as_deref())?;
            commands::fields::execute(&config)?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
