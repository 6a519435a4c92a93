use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tripplanner::cli::Cli;
use tripplanner::config::LoggingConfig;
use tripplanner::{TripPlanner, TripPlannerConfig, VERSION, web};

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = TripPlannerConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging, cli.verbose);
    info!("tripplanner {} starting", VERSION);

    let planner = TripPlanner::from_config(&config).context("Failed to build trip planner")?;
    web::run(&config.server, Arc::new(planner)).await
}
