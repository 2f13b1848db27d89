//! Topic commands.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::{TopicsAction, TopicsCommand};
use crate::config::Config;
use myaii_core::topics::{TopicSelection, TOPICS};

pub async fn execute(cmd: TopicsCommand, config: &Config) -> Result<()> {
    let store = config.open_store()?;
    let mut selection = TopicSelection::load(store.as_ref())?;

    match cmd.action {
        TopicsAction::List => {
            println!("{}", "Themen".cyan().bold());
            for topic in TOPICS {
                if selection.is_selected(topic) {
                    println!("  {} {}", "●".green(), topic.bold());
                } else {
                    println!("  {} {}", "○".dimmed(), topic);
                }
            }
        }
        TopicsAction::Toggle { topic } => {
            let selected = selection
                .toggle(&topic)
                .context("Run `myaii topics list` to see all topics")?;
            selection.save(store.as_ref())?;
            let state = if selected { "selected".green() } else { "removed".yellow() };
            println!("{} {}", topic.trim().to_uppercase().bold(), state);
        }
    }

    Ok(())
}
