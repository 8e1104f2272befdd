use crate::models::MovieId;

/// Failures raised by the movie and history stores.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Failures inside the recommendation pipeline. Never surfaced by the
/// public engine entry points, which fall back to popular movies instead.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Movie not found: {0}")]
    MovieNotFound(MovieId),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type EngineResult<T> = Result<T, EngineError>;
