use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use atelier_common::ArtifactStore;
use atelier_server::config::AppConfig;
use atelier_server::database::init_db;
use atelier_server::generation::{ImageProvider, OpenAiProvider};
use atelier_server::state::AppState;
use atelier_server::utils::hash;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `atelier-server hash-password <password>` prints a roster entry hash.
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args.next().context("usage: atelier-server hash-password <password>")?;
        let hash = hash::hash_password(&password)
            .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;
        println!("{hash}");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.auth.users.is_empty() {
        tracing::warn!("No users configured, nobody will be able to log in");
    }

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to database")?;

    let store =
        ArtifactStore::from_config(&config.storage).context("Invalid storage configuration")?;
    let provider = OpenAiProvider::from_config(&config.provider)
        .context("Failed to build provider client")?
        .map(|p| Arc::new(p) as Arc<dyn ImageProvider>);
    if provider.is_none() {
        tracing::warn!("Provider API key not configured, generations will be placeholders");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState::with_database(config, db, provider, store);
    let app = atelier_server::build_router(state);

    info!("Server running at http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
