// src/state.rs

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::assistant::service::AssistantService;
use crate::config::AppConfig;
use crate::db;

/// Shared application state, cloned into every handler via Arc.
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub assistant: Arc<AssistantService>,
}

/// Connect, migrate, and wire up services.
pub async fn create_app_state(config: AppConfig) -> Result<Arc<AppState>> {
    let pool = db::create_pool(&config.database_url, config.sqlite_max_connections).await?;
    db::run_migrations(&pool, Path::new("./migrations")).await?;
    info!("database ready at {}", config.database_url);

    build_app_state(pool, config)
}

/// Wire services onto an existing pool. Tests use this with an in-memory
/// database that is already migrated.
pub fn build_app_state(pool: SqlitePool, config: AppConfig) -> Result<Arc<AppState>> {
    let assistant = Arc::new(AssistantService::new(pool.clone(), &config.deepseek)?);

    Ok(Arc::new(AppState {
        db: pool,
        config,
        assistant,
    }))
}
