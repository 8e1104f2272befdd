pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, StoreError};
pub use models::*;
pub use services::recommendation::RecommendationEngine;

use anyhow::Result;
use services::store::memory::InMemoryStores;
use services::store::{HistoryStore, MovieStore};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: RecommendationEngine,
}

impl AppState {
    /// Seeds in-memory stores from the configured dataset, or starts empty.
    pub fn new(config: Config) -> Result<Self> {
        let stores = match &config.catalog.dataset_path {
            Some(path) => {
                info!("Loading dataset from {}", path);
                let (stores, _ratings) = InMemoryStores::load(path)?;
                stores
            }
            None => {
                info!("No dataset configured, starting with an empty catalog");
                InMemoryStores::from_dataset(Dataset::default())?
            }
        };

        Ok(Self::with_stores(config, stores.movies, stores.history))
    }

    pub fn with_stores(
        config: Config,
        movies: Arc<dyn MovieStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let config = Arc::new(config);
        let engine = RecommendationEngine::new(
            movies,
            history,
            Arc::new(config.recommendation.clone()),
        );

        Self { config, engine }
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
