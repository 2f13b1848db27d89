//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use myaii_core::profile::ProfileStore;
use myaii_core::streaming::StreamingClient;
use myaii_core::transport::media_globals_registered;

pub async fn execute(config: &Config) -> Result<()> {
    println!("{}", "myaii Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check data directory
    print!("  Data directory: ");
    if config.paths.data_dir.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ will be created".yellow());
    }

    // Check local store and profile
    print!("  Local store: ");
    match config.open_store() {
        Ok(store) => {
            println!("{}", "✓ readable".green());
            print!("  Profile: ");
            match ProfileStore::new(store).load() {
                Ok(Some(profile)) => println!("{}", profile.display_name().green()),
                Ok(None) => {
                    println!("{}", "○ not onboarded".yellow());
                    issues.push("No profile - run myaii onboard");
                }
                Err(e) => {
                    println!("{}", format!("✗ {}", e).red());
                    issues.push("Profile could not be read");
                }
            }
        }
        Err(e) => {
            println!("{}", format!("✗ {:#}", e).red());
            issues.push("Local store is not readable");
        }
    }

    // Check media globals
    print!("  Media globals: ");
    if media_globals_registered() {
        println!("{}", "✓ registered".green());
    } else {
        println!("{}", "✗ not registered".red());
        issues.push("Media globals were not registered at startup");
    }

    // Check streaming provider
    print!("  HeyGen API ({}): ", config.streaming.api_base_url);
    match StreamingClient::new(config.streaming.clone()) {
        Ok(client) if client.is_configured() => match client.create_token().await {
            Ok(_) => println!("{}", "✓ key accepted".green()),
            Err(e) => {
                println!("{}", format!("✗ {}", e).red());
                issues.push("HeyGen API rejected the request");
            }
        },
        Ok(_) => {
            println!("{}", "✗ no API key".red());
            issues.push("No HeyGen API key configured");
        }
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            issues.push("Streaming client could not be created");
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}
