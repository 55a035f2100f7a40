use std::sync::Arc;
use std::time::Instant;

use atelier_common::{ArtifactStore, ImageNormalizer};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::generation::{
    ClientSettings, GenerationClient, HistoryRepository, ImageProvider, Orchestrator, SeaOrmHistory,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
    pub history: Arc<dyn HistoryRepository>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the pipeline from already-built collaborators.
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        provider: Option<Arc<dyn ImageProvider>>,
        store: ArtifactStore,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        let client = GenerationClient::new(provider, ClientSettings::from(&config.provider));
        let orchestrator = Orchestrator::new(
            ImageNormalizer::new(config.generation.max_upload_bytes),
            client,
            store,
            history.clone(),
        );
        Self {
            db,
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            history,
            started_at: Instant::now(),
        }
    }

    /// State backed by the `generation` table of `db`.
    pub fn with_database(
        config: AppConfig,
        db: DatabaseConnection,
        provider: Option<Arc<dyn ImageProvider>>,
        store: ArtifactStore,
    ) -> Self {
        let history = Arc::new(SeaOrmHistory::new(db.clone()));
        Self::new(config, db, provider, store, history)
    }
}
