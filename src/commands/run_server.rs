use crate::config::Config;
use crate::rest;
use anyhow::{anyhow, Context};
use rocket::{Build, Rocket};
use tracing::info;

/// Run the database migrations, then start the web server,
/// its handlers share one connection pool.
pub async fn run_server(rocket: Rocket<Build>, config: Config) -> anyhow::Result<()> {
    let pool = config
        .database_pool()
        .await
        .map_err(anyhow::Error::msg)?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!(database = %config.database_url, "database ready");

    rest::mount(rocket, pool)
        .launch()
        .await
        .map_err(|e| anyhow!("server failed: {}", e))?;
    Ok(())
}
