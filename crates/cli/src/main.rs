//! Dojo CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP server (SSE chat, status, probe)
//! - `ask`: Run one research question in-process and print progress
//! - `status`: Probe the model endpoint
//! - `init`: Write the default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "dojo",
    about = "Dojo: a local research assistant that searches and reads the web",
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
    /// Start the HTTP server
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask one question and print the research progress
    Ask {
        /// The question to research
        #[arg(short, long)]
        message: String,
    },

    /// Check whether the model endpoint is reachable
    Status,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(host, port).await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Init { force } => commands::init::run(force).await?,
    }

    Ok(())
}
