//! productdesk CLI: the main entry point.
//!
//! Commands:
//! - `ask`      - Interactive or single-question mode
//! - `demo`     - Run the built-in demo questions
//! - `serve`    - Start the HTTP gateway with the chat page
//! - `domains`  - List the product domains
//! - `doctor`   - Diagnose configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "productdesk",
    about = "productdesk - NVIDIA product questions answered by a team of domain agents",
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
    /// Ask the sales agent a question
    Ask {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Run the predefined demo questions
    Demo,

    /// Start the HTTP gateway and chat page
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the registered product domains
    Domains,

    /// Diagnose configuration and credentials
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Demo => commands::demo::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Domains => commands::domains::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
