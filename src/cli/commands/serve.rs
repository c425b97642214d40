use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::database::{EntityStore, MemoryStore, PgStore};
use crate::server::{self, AppState};

pub async fn handle(
    mut config: AppConfig,
    port: Option<u16>,
    backend: Option<StoreBackend>,
) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(backend) = backend {
        config.database.backend = backend;
    }

    let store = open_store(&config).await?;
    let state = AppState::new(config, store)?;
    server::serve(state).await
}

/// The configured backend, ready to use.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn EntityStore>> {
    match config.database.backend {
        StoreBackend::Memory => {
            info!("Using in-memory entity store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.database)
                .await
                .context("failed to connect to Postgres")?;
            store.ensure_schema().await.context("failed to ensure schema")?;
            Ok(Arc::new(store))
        }
    }
}
