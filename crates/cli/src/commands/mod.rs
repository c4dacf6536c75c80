pub mod ask;
pub mod console;
pub mod demo;
pub mod doctor;
pub mod domains;
pub mod serve;

use productdesk_agent::{Coordinator, sales_coordinator};
use productdesk_config::AppConfig;
use productdesk_core::Error;
use productdesk_providers::CompletionClient;
use std::sync::Arc;
use tracing::debug;

use console::ConsoleNotifier;

/// Load config, failing with a readable message.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the catalog coordinator, printing setup help if no credential is found.
pub fn build_coordinator(config: &AppConfig) -> Result<Coordinator, Box<dyn std::error::Error>> {
    let client = match CompletionClient::from_config(config) {
        Ok(client) => client,
        Err(e @ Error::Config { .. }) => {
            print_key_help();
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    debug!(
        provider = client.provider_name(),
        model = client.model(),
        "Completion client ready"
    );

    Ok(sales_coordinator(
        Arc::new(client),
        Arc::new(ConsoleNotifier),
        &config.orchestrator,
    ))
}

fn print_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables (or put it in a .env file):");
    eprintln!("    PRODUCTDESK_API_KEY=...   (generic)");
    eprintln!("    ANTHROPIC_API_KEY=...     (Anthropic, the default provider)");
    eprintln!("    OPENAI_API_KEY=...        (with PRODUCTDESK_PROVIDER=openai)");
    eprintln!();
    eprintln!("  Or add api_key to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
}
