use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::server;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>, skip_migrations: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if skip_migrations {
        info!("Skipping database migrations");
    } else {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("Activity tracker API listening on http://{}", bind_addr);
    server::serve(listener, AppState::new(pool, config)).await?;
    Ok(())
}
