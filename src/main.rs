// src/main.rs

use anyhow::Result;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use smartlearn_backend::api::http::router::app_router;
use smartlearn_backend::config::AppConfig;
use smartlearn_backend::state::create_app_state;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let bind_address = config.bind_address();
    let state = create_app_state(config).await?;
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("listening on {}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
