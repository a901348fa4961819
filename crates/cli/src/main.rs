//! relay-inspect - query MEV relay data APIs from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{ConfigLoader, ConfigValidator, LoggingConfig};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use types::Slot;

mod app;

use app::{Application, Query};

#[derive(Debug, Parser)]
#[command(name = "relay-inspect", version, about = "Query MEV relay data APIs")]
struct Cli {
    /// Configuration file, defaults to $CONFIG_PATH or config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query only this relay instead of every enabled one
    #[arg(short, long)]
    relay: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bid trace of the payload delivered for a slot
    Delivered {
        #[arg(long)]
        slot: Slot,
    },
    /// Bids received for a slot
    Received {
        #[arg(long)]
        slot: Slot,
    },
    /// Proposers queued to obtain a blinded block
    Queued,
    /// Check the configuration and report warnings
    Validate,
    /// Write an example configuration file
    Init {
        #[arg(default_value = "config.yaml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv::dotenv();
    let cli = Cli::parse();

    if let Command::Init { path } = &cli.command {
        ConfigLoader::create_example(path)?;
        println!("Example configuration written to {}", path.display());
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .or_else(|| env::var("CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let config = ConfigLoader::load(&config_path).context("Failed to load configuration")?;

    init_logging(&config.logging)?;

    // Only warn if the error is not "file not found"
    if let Err(e) = dotenv_result {
        if !e.to_string().contains("No such file or directory") {
            warn!("Could not load .env file: {}", e);
        }
    }
    info!("Configuration loaded from: {}", config_path.display());

    let query = match cli.command {
        Command::Delivered { slot } => Query::DeliveredBidTrace(slot),
        Command::Received { slot } => Query::ReceivedBidTraces(slot),
        Command::Queued => Query::QueuedProposers,
        Command::Validate => {
            let report = ConfigValidator::validate(&config);
            for issue in &report.warnings {
                warn!(field = %issue.field, "{}", issue.message);
            }
            for issue in &report.errors {
                tracing::error!(field = %issue.field, "{}", issue.message);
            }
            println!("{}", report.summary());
            if !report.is_valid() {
                bail!("Configuration is invalid");
            }
            return Ok(());
        }
        Command::Init { .. } => return Ok(()),
    };

    let app = Application::new(&config, cli.relay.as_deref()).context("Failed to create application")?;
    let outcomes = app.run(query).await?;

    let failed = outcomes.iter().filter(|outcome| outcome.result.is_err()).count();
    for outcome in &outcomes {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    }

    if failed > 0 {
        bail!("{failed} of {} relay queries failed", outcomes.len());
    }
    Ok(())
}

/// Initialize logging on stderr, leaving stdout for query output
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let env_filter = logging
        .filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    info!("Logging initialized");
    info!("Log level: {}", logging.level);
    info!("Log format: {}", logging.format);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["relay-inspect", "--relay", "flashbots", "delivered", "--slot", "3939006"]).unwrap();
        assert_eq!(cli.relay.as_deref(), Some("flashbots"));
        assert!(matches!(cli.command, Command::Delivered { slot: 3_939_006 }));

        let cli = Cli::try_parse_from(["relay-inspect", "-c", "relays.yaml", "queued"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("relays.yaml")));
        assert!(matches!(cli.command, Command::Queued));

        assert!(Cli::try_parse_from(["relay-inspect", "received", "--slot", "-1"]).is_err());
        assert!(Cli::try_parse_from(["relay-inspect", "received"]).is_err());
    }
}
