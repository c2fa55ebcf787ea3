//! festive-api - REST server for the festival event catalog
//!
//! Settings resolve command line, then environment, then config file, then
//! defaults (see `festive_common::config`).

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use festive_api::{build_router, AppState};
use festive_common::config::{
    ConfigOverrides, ServiceConfig, ENV_BIND_ADDRESS, ENV_CONFIG_FILE, ENV_DATABASE_PATH,
};
use festive_common::db::{init_database, EventStore, OrganizerStore};
use festive_common::{EventService, OrganizerService};

#[derive(Debug, Parser)]
#[command(name = "festive-api", version, about = "Festival event catalog REST server")]
struct Args {
    /// SQLite database file
    #[arg(long, env = ENV_DATABASE_PATH)]
    database: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, env = ENV_BIND_ADDRESS)]
    bind: Option<String>,

    /// TOML config file
    #[arg(long, env = ENV_CONFIG_FILE)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting festive-api v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = ServiceConfig::resolve(&ConfigOverrides {
        database_path: args.database,
        bind_address: args.bind,
        config_file: args.config,
    })?;
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let events = EventService::with_system_clock(EventStore::new(pool.clone()));
    let organizers = OrganizerService::new(OrganizerStore::new(pool));
    let app = build_router(AppState::new(events, organizers));

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("festive-api listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
