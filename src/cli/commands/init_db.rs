use anyhow::Context;

use crate::config::AppConfig;
use crate::database::PgStore;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;
    store.ensure_schema().await.context("failed to create schema")?;
    store.close().await;

    println!("✓ Table '{}' is ready", config.database.table_name);
    Ok(())
}
