use clap::Parser;
use tracing_subscriber::EnvFilter;

use activity_tracker_api::cli::{self, Cli};
use activity_tracker_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, SECRET_KEY etc. are picked up
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting activity tracker in {:?} mode", config.environment);
    if config.security.uses_dev_secret() {
        tracing::warn!("SECRET_KEY is not set, signing tokens with the development secret");
    }

    cli::run(cli, config).await
}
