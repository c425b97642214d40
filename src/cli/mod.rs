pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, StoreBackend};

#[derive(Parser)]
#[command(name = "storefront-api")]
#[command(about = "Storefront API - users, products and orders over a single-table store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, value_enum, help = "Entity store backend (overrides STORE_BACKEND)")]
        backend: Option<StoreBackend>,
    },

    #[command(about = "Create the entity table and its index in Postgres")]
    InitDb,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        backend: None,
    }) {
        Commands::Serve { port, backend } => commands::serve::handle(config, port, backend).await,
        Commands::InitDb => commands::init_db::handle(config).await,
    }
}
