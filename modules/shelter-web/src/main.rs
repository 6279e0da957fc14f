use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shelter_common::Config;
use shelter_store::AnimalShelter;
use shelter_web::{load_logo, router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shelter=info".parse()?))
        .init();

    let config = Config::from_env()?;

    // Unreachable store is fatal at startup
    let shelter = AnimalShelter::connect(&config).await?;
    let logo = config.logo_path.as_deref().and_then(load_logo);

    let state = Arc::new(AppState { shelter, logo });
    let app = router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Shelter dashboard starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
