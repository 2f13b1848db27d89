//! Onboarding: create the local profile.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input};

use crate::config::Config;
use myaii_core::greetings::random_greeting;
use myaii_core::profile::{ProfileInput, ProfileStore};

pub async fn execute(name: Option<String>, phone: Option<String>, config: &Config) -> Result<()> {
    let profiles = ProfileStore::new(config.open_store()?);

    if let Some(existing) = profiles.load()? {
        if existing.is_onboarded {
            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "A profile for {} already exists. Replace it?",
                    existing.display_name()
                ))
                .default(false)
                .interact()?;
            if !overwrite {
                return Ok(());
            }
        }
    }

    let name = match name {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Name").interact_text()?,
    };
    let phone = match phone {
        Some(phone) => phone,
        None => Input::<String>::new()
            .with_prompt("Mobile number")
            .interact_text()?,
    };

    let profile = profiles
        .save(&ProfileInput::new(name, phone))
        .context("Onboarding failed")?;
    println!("{} Welcome, {}!", "✓".green(), profile.display_name().bold());
    println!("  {}", random_greeting().italic());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rejected_input_is_an_error() {
        let temp = tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.paths.data_dir = temp.path().to_path_buf();

        let result = execute(Some("Lea".to_string()), Some("12 3".to_string()), &config).await;
        assert!(result.is_err());

        let profiles = ProfileStore::new(config.open_store().unwrap());
        assert!(profiles.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_onboard_with_arguments() {
        let temp = tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.paths.data_dir = temp.path().to_path_buf();

        execute(Some("Lea".to_string()), Some("0791234567".to_string()), &config)
            .await
            .unwrap();

        let profiles = ProfileStore::new(config.open_store().unwrap());
        assert_eq!(profiles.avatar_name().unwrap(), Some("Lea".to_string()));
    }
}
