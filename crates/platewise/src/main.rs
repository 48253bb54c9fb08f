//! Platewise CLI - dish estimation from food photos.
//!
//! Several vision models vote on what is on the plate; their labels are
//! folded into a fixed dish vocabulary with default portion sizes. The
//! estimator is served over HTTP or run one-shot from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Serve the authenticated estimate endpoint
//! platewise serve --port 8100
//!
//! # Estimate a single photo
//! platewise estimate lunch.jpg --pretty
//!
//! # View configuration
//! platewise config show
//!
//! # List the dish vocabulary
//! platewise vocab --grams
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// Platewise - dish estimation from food photos.
#[derive(Parser, Debug)]
#[command(name = "platewise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "PLATEWISE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the estimate endpoint over HTTP
    Serve(cli::serve::ServeArgs),

    /// Estimate the dish in a single image
    Estimate(cli::estimate::EstimateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    /// List the canonical dish vocabulary
    Vocab(cli::vocab::VocabArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path: Option<PathBuf> = cli.config.as_deref().map(platewise_core::Config::expand_path);

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let loaded = match &config_path {
        Some(path) => platewise_core::Config::load_from(path),
        None => platewise_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `platewise config path`."
            );
            platewise_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Platewise v{}", platewise_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Estimate(args) => cli::estimate::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, config_path).await,
        Commands::Vocab(args) => cli::vocab::execute(args).await,
    }
}
