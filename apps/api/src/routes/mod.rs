pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

/// Room for both text fields plus JSON escaping, so oversized texts reach the
/// handler's validation instead of being cut off by the extractor.
fn body_limit(max_text_bytes: usize) -> usize {
    max_text_bytes.saturating_mul(4).saturating_add(64 * 1024)
}

pub fn build_router(state: AppState) -> Router {
    let limit = body_limit(state.config.max_text_bytes);
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/evaluations", post(handlers::handle_evaluate))
        .route("/api/v1/analytics", get(handlers::handle_analytics))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}
