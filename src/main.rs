use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tideline::config::{StrategyConfig, StrategyKind};
use tideline::session::Session;
use tideline::strategy::StrategyEngine;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Decision procedure; overrides the one in the config file
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyKind>,

    /// JSON file with strategy tunables
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => StrategyConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }
    info!("Starting with {:?}", config);

    // Communication happens through stdin/stdout.
    // Stderr is used for logging.
    let stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    Session::new(StrategyEngine::new(config)).run(stdin, &mut stdout)?;
    Ok(())
}

fn load_config(path: &PathBuf) -> anyhow::Result<StrategyConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
