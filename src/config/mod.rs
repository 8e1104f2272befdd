use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub recommendation: RecommendationConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON dataset used to seed the in-memory stores.
    pub dataset_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalizationStrategy {
    MostRecentItem,
    FullHistoryHybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub strategy: PersonalizationStrategy,
    pub default_limit: usize,
    /// Store rows fetched per requested genre candidate.
    pub content_pool_multiplier: usize,
    pub description_pool_multiplier: usize,
    pub collaborative_pool_multiplier: usize,
    pub neighbor_limit: usize,
    pub scan_limit: usize,
    pub similarity_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub k: usize,
    pub max_users: usize,
    pub min_history: usize,
    pub min_ratings: usize,
    /// Catalog rating a watched movie needs to count as relevant.
    pub catalog_rating_threshold: f64,
    /// Explicit user rating a movie needs to count as relevant.
    pub user_rating_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            catalog: CatalogConfig { dataset_path: None },
            recommendation: RecommendationConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            strategy: PersonalizationStrategy::MostRecentItem,
            default_limit: 10,
            content_pool_multiplier: 3,
            description_pool_multiplier: 3,
            collaborative_pool_multiplier: 2,
            neighbor_limit: 50,
            scan_limit: 10_000,
            similarity_cache: false,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k: 10,
            max_users: 200,
            min_history: 3,
            min_ratings: 1,
            catalog_rating_threshold: 7.0,
            user_rating_threshold: 3.0,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("CINEREC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
