//! Application setup and initialization.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use surat_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the tracing subscriber. JSON output in production, human-readable
/// otherwise; `RUST_LOG` overrides the default filter.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info"));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize the entire application: config validation, database pool and
/// migrations, object storage, and the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config)?;

    let state = Arc::new(AppState::new(config.clone(), pool, storage));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
