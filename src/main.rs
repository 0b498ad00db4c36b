use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uas_classifier::{Classifier, TableOrigin, config::Config};

#[derive(Parser)]
#[command(name = "uas-classifier")]
#[command(version)]
#[command(about = "Classify user agent strings using the user-agent-string.info database")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Cache capacity (overrides config file)
    #[arg(long, value_name = "ENTRIES")]
    cache_capacity: Option<usize>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the classification of each user agent as JSON
    Classify {
        #[arg(required = true)]
        user_agents: Vec<String>,
    },
    /// Download and compile a fresh signature database
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("uas_classifier={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting UAS classifier v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(capacity) = cli.cache_capacity {
        config.cache.capacity = capacity;
    }

    let classifier = Classifier::from_config(&config).await?;

    match cli.command {
        Command::Classify { user_agents } => {
            for user_agent in user_agents {
                let result = classifier.classify(&user_agent)?;
                println!("{}", serde_json::to_string(&result)?);
            }
        }
        Command::Refresh => {
            // a first run has just downloaded the table
            if classifier.origin() != TableOrigin::Fetched {
                classifier.refresh().await?;
            }
            let table = classifier.table();
            info!(
                robots = table.robots().len(),
                os_rules = table.os_rules().len(),
                browser_rules = table.browser_rules().len(),
                "Signature table is up to date"
            );
        }
    }

    Ok(())
}
