//! Avatar chat commands.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::cli::{AvatarAction, AvatarCommand};
use crate::config::Config;
use myaii_core::config::ENV_API_KEY;
use myaii_core::greetings::avatar_greeting;
use myaii_core::profile::ProfileStore;
use myaii_core::streaming::{NewSessionOptions, StreamingClient, TaskType};
use myaii_core::transport::{LoggingTransport, MediaTransport};
use myaii_core::AvatarSession;

pub async fn execute(cmd: AvatarCommand, config: &Config) -> Result<()> {
    match cmd.action {
        AvatarAction::Chat { avatar, repeat } => chat(avatar, repeat, config).await,
        AvatarAction::Check => check(config).await,
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn missing_key() -> anyhow::Error {
    anyhow!(
        "No HeyGen API key configured. Set {} or add streaming.api_key to {}",
        ENV_API_KEY,
        Config::config_path().display()
    )
}

/// The avatar answers the greeting conversationally.
fn opening_line(name: &str) -> (String, TaskType) {
    (avatar_greeting(name), TaskType::Talk)
}

async fn chat(avatar: Option<String>, repeat: bool, config: &Config) -> Result<()> {
    let session = AvatarSession::from_config(config.streaming.clone())
        .context("Failed to create streaming client")?;
    if !session.is_configured() {
        return Err(missing_key());
    }

    let profiles = ProfileStore::new(config.open_store()?);
    let name = profiles.avatar_name()?.unwrap_or_else(|| "du".to_string());

    let options = match avatar {
        Some(id) => NewSessionOptions::with_avatar(id),
        None => NewSessionOptions::default(),
    };

    let pb = spinner("Connecting to avatar...");
    let started = session.start(&options).await;
    pb.finish_and_clear();

    let handle = started.context("Could not start avatar session")?;
    println!("{} Connected (session {})", "✓".green(), handle.session_id().cyan());

    let transport = LoggingTransport::new();
    if let Err(e) = transport.connect(&handle.transport_credentials()).await {
        warn!("Media transport failed to connect: {}", e);
    }

    let (greeting, greeting_mode) = opening_line(&name);
    if let Err(e) = session.send(&greeting, greeting_mode).await {
        warn!("Greeting was not delivered: {}", e);
    }

    let task_type = if repeat { TaskType::Repeat } else { TaskType::Talk };
    println!("  Type a message and press Enter. {} or Ctrl-D to leave.", "/quit".cyan());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let text = line.trim();
        if text == "/quit" || text == "/exit" {
            break;
        }
        if text.is_empty() {
            continue;
        }

        match session.send(text, task_type).await {
            Ok(()) => println!("{} {}", "→".cyan(), "sent".dimmed()),
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }

    if let Err(e) = transport.disconnect().await {
        warn!("Media transport failed to disconnect: {}", e);
    }
    session.stop().await;
    println!("{} Session closed", "✓".green());

    Ok(())
}

async fn check(config: &Config) -> Result<()> {
    let client = StreamingClient::new(config.streaming.clone())
        .context("Failed to create streaming client")?;
    if !client.is_configured() {
        return Err(missing_key());
    }

    let pb = spinner("Requesting session token...");
    let result = client.create_token().await;
    pb.finish_and_clear();

    result.context("API key check failed")?;
    println!(
        "{} API key accepted by {}",
        "✓".green(),
        config.streaming.api_base_url
    );

    Ok(())
}
