//! Print an encouragement.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use myaii_core::greetings::{avatar_greeting, random_greeting};
use myaii_core::profile::ProfileStore;

pub async fn execute(config: &Config) -> Result<()> {
    let profiles = ProfileStore::new(config.open_store()?);

    println!("{}", random_greeting().italic());
    if let Some(profile) = profiles.load()? {
        println!("  {}", avatar_greeting(profile.display_name()).dimmed());
    }
    Ok(())
}
