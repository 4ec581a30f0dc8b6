use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::similarity::OracleError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Failure of a single pipeline stage. Never escapes the pipeline: the
/// orchestrator records its message in the run's error list and substitutes
/// defaults for the stage's outputs.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{0} text is empty")]
    EmptyInput(&'static str),

    #[error("{stage} error: {message}")]
    Panicked { stage: &'static str, message: String },

    #[error("Similarity service error: {0}")]
    Similarity(#[from] OracleError),

    /// Index or search failure; the semantic score is unaffected.
    #[error("Vector index error: {0}")]
    VectorIndex(OracleError),

    #[error("Ranking pool error: {0}")]
    ScorePool(#[from] AppError),
}
