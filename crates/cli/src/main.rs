//! Rayo CLI — the main entry point.
//!
//! Commands:
//! - `start`   — Interactive coding session
//! - `config`  — Setup wizard for API keys and model settings
//! - `tools`   — Print the capability schemas as JSON
//! - `version` — Show the version

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rayo",
    about = "A professional AI coding assistant for the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive coding assistant
    Start {
        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Configure API keys and preferences
    Config,

    /// Print the available capabilities and their parameter schemas
    Tools,

    /// Show the version of Rayo
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with replies on stdout
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Start { model } => commands::start::run(model).await?,
        Commands::Config => commands::config_cmd::run().await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Version => println!("Rayo version {}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}
