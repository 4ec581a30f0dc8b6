mod config;
mod db;
mod errors;
mod evaluation;
mod models;
mod persistence;
mod routes;
mod similarity;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::evaluation::pipeline::EvaluationPipeline;
use crate::evaluation::ExtractionConfig;
use crate::persistence::{
    AnalyticsSource, InMemoryEvaluationStore, PersistenceCollaborator, PgEvaluationStore,
    ScorePool,
};
use crate::routes::build_router;
use crate::similarity::{Embedder, HashingEmbedder, HttpEmbedder, IndexedOracle};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-eval v{}", env!("CARGO_PKG_VERSION"));

    // Storage: Postgres when configured, otherwise in memory
    let (persistence, scores, analytics): (
        Arc<dyn PersistenceCollaborator>,
        Arc<dyn ScorePool>,
        Arc<dyn AnalyticsSource>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            let store = Arc::new(PgEvaluationStore::new(pool));
            (
                store.clone() as Arc<dyn PersistenceCollaborator>,
                store.clone() as Arc<dyn ScorePool>,
                store as Arc<dyn AnalyticsSource>,
            )
        }
        None => {
            warn!("DATABASE_URL not set; evaluations are kept in memory");
            let store = Arc::new(InMemoryEvaluationStore::new());
            (
                store.clone() as Arc<dyn PersistenceCollaborator>,
                store.clone() as Arc<dyn ScorePool>,
                store as Arc<dyn AnalyticsSource>,
            )
        }
    };

    // Embeddings: remote API when configured, otherwise local feature hashing
    let embedder: Arc<dyn Embedder> = match &config.embedding_api_url {
        Some(url) => {
            info!("Embedding API: {url} (model: {})", config.embedding_model);
            Arc::new(HttpEmbedder::new(
                url.clone(),
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
            )?)
        }
        None => {
            info!("Using local hashing embedder (dim: {})", config.embedding_dim);
            Arc::new(HashingEmbedder::new(config.embedding_dim))
        }
    };
    let oracle = Arc::new(IndexedOracle::new(embedder));

    let pipeline = EvaluationPipeline::new(
        oracle,
        scores,
        ExtractionConfig {
            reference_year: config.reference_year,
        },
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        persistence,
        analytics,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
