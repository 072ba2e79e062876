mod config;

use std::net::SocketAddr;

use tracing::{info, warn};

use marketai_api::AppStateInner;
use marketai_db::Database;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketai=debug,marketai_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.uses_placeholder_secret() {
        warn!("MARKETAI_JWT_SECRET is unset or still the placeholder; tokens are forgeable");
    }

    // Init store
    let db = Database::open(&config.db_path)?;

    let state = AppStateInner::new(db, config.api.clone())?;
    let app = marketai_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("MarketAI server listening on {}", addr);
    info!("Image edits forwarded to {}", config.api.edit_api_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
