//! myaii - MyAII companion CLI
//!
//! Local profile, diary and topics plus a line-based chat with the
//! HeyGen streaming avatar.

use anyhow::Result;
use clap::Parser;
use std::future::Future;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("myaii=info".parse()?)
                .add_directive("myaii_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    with_media_globals(async {
        match cli.command {
            Commands::Onboard { name, phone } => commands::onboard::execute(name, phone, &config).await,
            Commands::Avatar(cmd) => commands::avatar::execute(cmd, &config).await,
            Commands::Profile(cmd) => commands::profile::execute(cmd, &config).await,
            Commands::Diary(cmd) => commands::diary::execute(cmd, &config).await,
            Commands::Topics(cmd) => commands::topics::execute(cmd, &config).await,
            Commands::Greet => commands::greet::execute(&config).await,
            Commands::Doctor => commands::doctor::execute(&config).await,
            Commands::Version => {
                println!("myaii {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    })
    .await
}

/// Run `command` with the process-wide media globals registered, releasing
/// them afterwards whether it succeeded or not.
async fn with_media_globals<F>(command: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    myaii_core::transport::ensure_media_globals();
    let result = command.await;
    myaii_core::transport::release_media_globals();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use myaii_core::transport::media_globals_registered;

    #[tokio::test]
    async fn test_media_globals_released_after_command() {
        let ok = with_media_globals(async {
            assert!(media_globals_registered());
            Ok(())
        })
        .await;
        assert!(ok.is_ok());
        assert!(!media_globals_registered());

        let failed = with_media_globals(async { Err(anyhow::anyhow!("boom")) }).await;
        assert!(failed.is_err());
        assert!(!media_globals_registered());
    }
}
