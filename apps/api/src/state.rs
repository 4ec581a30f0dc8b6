use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::pipeline::EvaluationPipeline;
use crate::persistence::{AnalyticsSource, PersistenceCollaborator};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EvaluationPipeline>,
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub persistence: Arc<dyn PersistenceCollaborator>,
    pub analytics: Arc<dyn AnalyticsSource>,
    pub config: Config,
}
