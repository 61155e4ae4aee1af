use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use seeder::config::Args;

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config();

    info!("Reset Database: {}", config.reset);
    info!("Force Upload: {}", config.force);
    info!("Minimum Docs Per Collection: {}", config.min_docs);

    match seeder::run(&config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("FATAL ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
