use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use event_planner_api::{app, config::ConfigOverrides, database::Database, AppConfig, AppState};

#[derive(Debug, Parser)]
#[command(name = "event-planner-api", version, about = "Event planning REST backend")]
struct Cli {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// postgres://... or memory:// (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Create the schema and exit
    #[arg(long)]
    init_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET_KEY
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env_with(ConfigOverrides {
        host: cli.host,
        port: cli.port,
        database_url: cli.database_url,
    })
    .context("invalid configuration")?;
    tracing::info!("Starting Event Planner API in {:?} mode", config.environment);

    let database = Database::connect(&config)
        .await
        .context("failed to open the database")?;

    if cli.init_db {
        tracing::info!("Schema initialized, exiting");
        database.close().await;
        return Ok(());
    }

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, &database);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Event Planner API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
