use cinerec::utils::validation::validate_limit;
use cinerec::{init_tracing, AppState, Config, EngineError, Recommendation};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

fn resolve_limit(state: &AppState, params: &LimitQuery) -> Result<usize, StatusCode> {
    let limit = params
        .limit
        .unwrap_or(state.config.recommendation.default_limit);

    validate_limit(limit).map_err(|e| {
        tracing::warn!("Rejected request: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    Ok(limit)
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "cinerec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Recommendation>>, StatusCode> {
    let limit = resolve_limit(&state, &params)?;
    let recommendation = state.engine.recommend(user_id, limit).await;

    info!(
        "Served {} {:?} recommendations for user {}",
        recommendation.movies.len(),
        recommendation.kind,
        user_id
    );
    Ok(Json(ApiResponse::success(recommendation)))
}

async fn get_similar_movies(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Recommendation>>, StatusCode> {
    let limit = resolve_limit(&state, &params)?;

    match state.engine.similar_by_id(movie_id, limit).await {
        Ok(recommendation) => {
            info!(
                "Served {} {:?} movies similar to {}",
                recommendation.movies.len(),
                recommendation.kind,
                movie_id
            );
            Ok(Json(ApiResponse::success(recommendation)))
        }
        Err(EngineError::MovieNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get similar movies: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route("/movies/:movie_id/similar", get(get_similar_movies))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        init_tracing().await;
        info!(
            "Starting cinerec server with {:?} strategy on {} workers",
            config.recommendation.strategy, config.server.workers
        );
        serve(config).await
    })
}
