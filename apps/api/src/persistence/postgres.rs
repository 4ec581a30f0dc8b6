use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::analytics::{summarize, AnalyticsSnapshot, EvaluationAnalytics};
use crate::evaluation::pipeline::EvaluationRun;
use crate::models::evaluation::EvaluationScoreRow;
use crate::persistence::{is_scored, AnalyticsSource, PersistenceCollaborator, ScorePool};

/// Postgres-backed store. Tables are created by `db::ensure_schema`.
#[derive(Clone)]
pub struct PgEvaluationStore {
    pool: PgPool,
}

impl PgEvaluationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs a query yielding one skill name per row.
    async fn skill_elements(&self, sql: &'static str) -> Result<Vec<String>, AppError> {
        Ok(sqlx::query_scalar(sql).fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl PersistenceCollaborator for PgEvaluationStore {
    /// Writes all three records in one transaction; on error nothing is kept.
    async fn persist(&self, run: &EvaluationRun) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO resumes (id, candidate_name, email, phone, experience_years, profile)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                candidate_name = EXCLUDED.candidate_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                experience_years = EXCLUDED.experience_years,
                profile = EXCLUDED.profile,
                updated_at = NOW()
            "#,
        )
        .bind(run.resume_id)
        .bind(&run.candidate.name)
        .bind(&run.candidate.email)
        .bind(&run.candidate.phone)
        .bind(run.candidate.experience_years)
        .bind(Json(&run.candidate))
        .execute(&mut *tx)
        .await?;

        if let Some(job_id) = run.job_id {
            sqlx::query(
                r#"
                INSERT INTO job_descriptions (id, title, experience_required, requirement)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    experience_required = EXCLUDED.experience_required,
                    requirement = EXCLUDED.requirement,
                    updated_at = NOW()
                "#,
            )
            .bind(job_id)
            .bind(&run.job.title)
            .bind(run.job.experience_required_years)
            .bind(Json(&run.job))
            .execute(&mut *tx)
            .await?;
        }

        let overall = is_scored(run).then_some(run.scores.overall);
        let rank = run.rank.map(|r| r as i32);
        let steps: Vec<String> = run.completed_steps.iter().map(|s| s.as_str().to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO evaluations
                (id, resume_id, job_description_id, overall_score, semantic_score,
                 skill_match_score, experience_score, education_score, candidate_ranking,
                 skill_gap, similar_candidates, recommendations, recommendation_text,
                 completed_steps, errors, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, 'completed')
            ON CONFLICT (id) DO UPDATE SET
                resume_id = EXCLUDED.resume_id,
                job_description_id = EXCLUDED.job_description_id,
                overall_score = EXCLUDED.overall_score,
                semantic_score = EXCLUDED.semantic_score,
                skill_match_score = EXCLUDED.skill_match_score,
                experience_score = EXCLUDED.experience_score,
                education_score = EXCLUDED.education_score,
                candidate_ranking = EXCLUDED.candidate_ranking,
                skill_gap = EXCLUDED.skill_gap,
                similar_candidates = EXCLUDED.similar_candidates,
                recommendations = EXCLUDED.recommendations,
                recommendation_text = EXCLUDED.recommendation_text,
                completed_steps = EXCLUDED.completed_steps,
                errors = EXCLUDED.errors,
                status = EXCLUDED.status
            "#,
        )
        .bind(run.evaluation_id)
        .bind(run.resume_id)
        .bind(run.job_id)
        .bind(overall)
        .bind(run.scores.semantic)
        .bind(run.scores.skill)
        .bind(run.scores.experience)
        .bind(run.scores.education)
        .bind(rank)
        .bind(Json(&run.skill_gap))
        .bind(Json(&run.similar_candidates))
        .bind(Json(&run.recommendations))
        .bind(&run.recommendation_text)
        .bind(&steps)
        .bind(&run.errors)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            "Persisted evaluation {} (resume {}, job {:?})",
            run.evaluation_id, run.resume_id, run.job_id
        );
        Ok(())
    }
}

#[async_trait]
impl ScorePool for PgEvaluationStore {
    async fn completed_scores(&self, job_id: Uuid) -> Result<Vec<(Uuid, f64)>, AppError> {
        let rows = sqlx::query_as::<_, EvaluationScoreRow>(
            r#"
            SELECT id, overall_score
            FROM evaluations
            WHERE job_description_id = $1 AND overall_score IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.id, r.overall_score)).collect())
    }
}

#[async_trait]
impl AnalyticsSource for PgEvaluationStore {
    async fn analytics(&self) -> Result<EvaluationAnalytics, AppError> {
        let total_resumes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
            .fetch_one(&self.pool)
            .await?;
        let total_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_descriptions")
            .fetch_one(&self.pool)
            .await?;
        let total_evaluations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM evaluations")
            .fetch_one(&self.pool)
            .await?;

        let scores: Vec<f64> = sqlx::query_scalar(
            "SELECT overall_score FROM evaluations WHERE overall_score IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        let required_skills = self
            .skill_elements("SELECT jsonb_array_elements_text(requirement->'required_skills') FROM job_descriptions")
            .await?;
        let resume_skills = self
            .skill_elements("SELECT jsonb_array_elements_text(profile->'skills') FROM resumes")
            .await?;
        let missing_required = self
            .skill_elements("SELECT jsonb_array_elements_text(skill_gap->'missing_required') FROM evaluations")
            .await?;

        Ok(summarize(AnalyticsSnapshot {
            total_resumes: total_resumes as usize,
            total_jobs: total_jobs as usize,
            total_evaluations: total_evaluations as usize,
            scores,
            required_skills,
            resume_skills,
            missing_required,
        }))
    }
}
