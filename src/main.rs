use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use occam_match::api::{create_router, AppState};
use occam_match::config::Config;
use occam_match::services::{Recommender, SharedArtifacts};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // A bundle that cannot be loaded is fatal: refuse to start
    let artifacts = SharedArtifacts::new(config.artifact_paths());
    let bundle = artifacts.get().map_err(|e| {
        anyhow::anyhow!(
            "Failed to load artifacts from {}: {}",
            config.artifact_dir.display(),
            e
        )
    })?;

    let recommender = Arc::new(Recommender::new(bundle, config.mapping_policy));
    let state = AppState::new(recommender, &config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
