//! `productdesk doctor`: Diagnose configuration.

use productdesk_config::{AppConfig, vendor_key_var};
use productdesk_core::Provider;
use productdesk_providers::router::{build_from_config, requires_api_key};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 productdesk Doctor - Configuration Diagnostics");
    println!("================================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file: {}", config_path.display());
    } else {
        println!("  ℹ️  No config file at {} - using defaults", config_path.display());
        println!("     A starting point:\n");
        for line in AppConfig::default_toml().lines() {
            println!("       {line}");
        }
        println!();
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            println!("     Provider: {}", config.default_provider);
            println!("     Model:    {}", config.default_model);
            println!(
                "     Timeouts: {}s per call, {}s per query",
                config.orchestrator.call_timeout_secs, config.orchestrator.query_timeout_secs
            );

            if !requires_api_key(&config.default_provider) {
                println!("  ✅ Provider '{}' needs no API key", config.default_provider);
            } else if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                match vendor_key_var(&config.default_provider) {
                    Some(var) => println!("  ⚠️  No API key - set PRODUCTDESK_API_KEY or {var}"),
                    None => println!("  ⚠️  No API key - set PRODUCTDESK_API_KEY"),
                }
                issues += 1;
            }

            let router = build_from_config(&config);
            println!("     Providers: {}", router.list().join(", "));
            if let Some(provider) = router.default() {
                match provider.health_check().await {
                    Ok(true) => println!("  ✅ Provider '{}' is healthy", provider.name()),
                    Ok(false) => {
                        println!("  ⚠️  Provider '{}' failed its health check", provider.name());
                        issues += 1;
                    }
                    Err(e) => {
                        println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                        issues += 1;
                    }
                }
            }
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
