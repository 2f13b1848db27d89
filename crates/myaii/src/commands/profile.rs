//! Profile commands.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::{ProfileAction, ProfileCommand};
use crate::config::Config;
use myaii_core::profile::{initial_route, InitialRoute, ProfileStore, ProfileUpdate, UserProfile};

pub async fn execute(cmd: ProfileCommand, config: &Config) -> Result<()> {
    let profiles = ProfileStore::new(config.open_store()?);

    match cmd.action {
        ProfileAction::Show { json } => show(&profiles, json),
        ProfileAction::Set {
            name,
            phone,
            email,
            language,
        } => {
            let update = ProfileUpdate {
                name,
                phone,
                email,
                language,
            };
            let profile = profiles
                .update(&update)
                .context("Profile update failed")?;
            println!("{} Profile updated", "✓".green());
            print_profile(&profile);
            Ok(())
        }
        ProfileAction::Clear { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Delete the local profile?")
                    .default(false)
                    .interact()?;
            if confirmed {
                profiles.clear()?;
                println!("{} Logged out", "✓".green());
            }
            Ok(())
        }
    }
}

fn show(profiles: &ProfileStore, json: bool) -> Result<()> {
    let profile = profiles.load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    if initial_route(profile.as_ref()) == InitialRoute::Login {
        println!("{} Not onboarded yet.", "○".yellow());
        println!("  Run {}", "myaii onboard".cyan());
        return Ok(());
    }

    if let Some(profile) = profile {
        print_profile(&profile);
    }
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!(
        "{}  {}",
        format!("[{}]", profile.initials()).cyan().bold(),
        profile.display_name().bold()
    );
    println!("  Phone:    {}", profile.phone);
    println!(
        "  Email:    {}",
        profile.email.as_deref().unwrap_or("(none)")
    );
    println!("  Language: {}", profile.language);
    println!(
        "  Since:    {}",
        profile.created_at.format("%d.%m.%Y")
    );
}
