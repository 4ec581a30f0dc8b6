use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::analytics::EvaluationAnalytics;
use crate::evaluation::pipeline::{EvaluationRun, RunIds};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub resume_text: String,
    pub job_text: String,
    pub resume_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub evaluation_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub run: EvaluationRun,
    pub score_label: &'static str,
    /// False when the store rejected the run; the run itself is unaffected.
    pub persisted: bool,
}

/// POST /api/v1/evaluations
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let limit = state.config.max_text_bytes;
    for (field, text) in [("resume_text", &req.resume_text), ("job_text", &req.job_text)] {
        if text.len() > limit {
            return Err(AppError::Validation(format!(
                "{field} exceeds the maximum of {limit} bytes"
            )));
        }
    }

    let ids = RunIds {
        resume_id: req.resume_id.unwrap_or_else(Uuid::new_v4),
        // Without an explicit job id the posting is treated as one-off.
        job_id: req.job_id,
        evaluation_id: req.evaluation_id.unwrap_or_else(Uuid::new_v4),
    };

    let run = state
        .pipeline
        .evaluate(&req.resume_text, &req.job_text, ids)
        .await;

    let persisted = match state.persistence.persist(&run).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to persist evaluation {}: {e}", run.evaluation_id);
            false
        }
    };

    info!(
        "Evaluation {} finished: overall={} persisted={persisted}",
        run.evaluation_id, run.scores.overall
    );
    Ok(Json(EvaluationResponse {
        score_label: run.scores.label(),
        run,
        persisted,
    }))
}

/// GET /api/v1/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
) -> Result<Json<EvaluationAnalytics>, AppError> {
    let analytics = state.analytics.analytics().await?;
    Ok(Json(analytics))
}
