use sqlx::FromRow;
use uuid::Uuid;

/// One entry of the ranking pool.
#[derive(Debug, Clone, FromRow)]
pub struct EvaluationScoreRow {
    pub id: Uuid,
    pub overall_score: f64,
}
