use deycook::{router, AppConfig, AppState};
use log::{info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    if config.mock_mode() {
        warn!("Running in mock mode: recipes are canned and no generation calls are made");
    } else {
        info!("Using generation model {}", config.generation.model);
    }

    let state = Arc::new(AppState::new(&config)?);
    let app = router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
