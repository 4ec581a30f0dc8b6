//! Storage collaborators for finished evaluations.
//!
//! `PersistenceCollaborator` is the write side, `ScorePool` the read side used
//! by ranking and `AnalyticsSource` the aggregate read. All three are
//! implemented by the Postgres store and by an in-memory store used without a
//! database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::analytics::{summarize, AnalyticsSnapshot, EvaluationAnalytics};
use crate::evaluation::jd_parser::JobRequirement;
use crate::evaluation::pipeline::{EvaluationRun, Stage};
use crate::evaluation::resume_parser::CandidateProfile;

pub mod postgres;

pub use postgres::PgEvaluationStore;

/// Upserts the résumé profile, job requirement and evaluation of a run.
#[async_trait]
pub trait PersistenceCollaborator: Send + Sync {
    async fn persist(&self, run: &EvaluationRun) -> Result<(), AppError>;
}

#[async_trait]
pub trait ScorePool: Send + Sync {
    /// `(evaluation_id, overall)` of every scored evaluation of the job, oldest first.
    async fn completed_scores(&self, job_id: Uuid) -> Result<Vec<(Uuid, f64)>, AppError>;
}

/// Totals, score distribution and skill frequencies over everything stored.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn analytics(&self) -> Result<EvaluationAnalytics, AppError>;
}

/// Whether a run produced a score worth ranking against.
pub(crate) fn is_scored(run: &EvaluationRun) -> bool {
    run.completed_steps.contains(&Stage::Score)
}

#[derive(Debug, Clone)]
struct StoredEvaluation {
    id: Uuid,
    job_id: Option<Uuid>,
    overall: Option<f64>,
    missing_required: Vec<String>,
}

#[derive(Default)]
struct MemoryTables {
    resumes: HashMap<Uuid, CandidateProfile>,
    jobs: HashMap<Uuid, JobRequirement>,
    /// Insertion order is kept so ties rank oldest first.
    evaluations: Vec<StoredEvaluation>,
}

#[derive(Default)]
pub struct InMemoryEvaluationStore {
    tables: RwLock<MemoryTables>,
}

impl InMemoryEvaluationStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn resume(&self, id: Uuid) -> Option<CandidateProfile> {
        self.tables.read().await.resumes.get(&id).cloned()
    }

    #[cfg(test)]
    pub async fn job(&self, id: Uuid) -> Option<JobRequirement> {
        self.tables.read().await.jobs.get(&id).cloned()
    }
}

#[async_trait]
impl PersistenceCollaborator for InMemoryEvaluationStore {
    async fn persist(&self, run: &EvaluationRun) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.resumes.insert(run.resume_id, run.candidate.clone());
        if let Some(job_id) = run.job_id {
            tables.jobs.insert(job_id, run.job.clone());
        }

        let stored = StoredEvaluation {
            id: run.evaluation_id,
            job_id: run.job_id,
            overall: is_scored(run).then_some(run.scores.overall),
            missing_required: run.skill_gap.missing_required.iter().cloned().collect(),
        };
        match tables.evaluations.iter_mut().find(|e| e.id == run.evaluation_id) {
            Some(existing) => *existing = stored,
            None => tables.evaluations.push(stored),
        }
        debug!("Stored evaluation {} in memory", run.evaluation_id);
        Ok(())
    }
}

#[async_trait]
impl ScorePool for InMemoryEvaluationStore {
    async fn completed_scores(&self, job_id: Uuid) -> Result<Vec<(Uuid, f64)>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .evaluations
            .iter()
            .filter(|e| e.job_id == Some(job_id))
            .filter_map(|e| e.overall.map(|score| (e.id, score)))
            .collect())
    }
}

#[async_trait]
impl AnalyticsSource for InMemoryEvaluationStore {
    async fn analytics(&self) -> Result<EvaluationAnalytics, AppError> {
        let tables = self.tables.read().await;
        let snapshot = AnalyticsSnapshot {
            total_resumes: tables.resumes.len(),
            total_jobs: tables.jobs.len(),
            total_evaluations: tables.evaluations.len(),
            scores: tables.evaluations.iter().filter_map(|e| e.overall).collect(),
            required_skills: tables
                .jobs
                .values()
                .flat_map(|j| j.required_skills.iter().cloned())
                .collect(),
            resume_skills: tables
                .resumes
                .values()
                .flat_map(|r| r.skills.iter().cloned())
                .collect(),
            missing_required: tables
                .evaluations
                .iter()
                .flat_map(|e| e.missing_required.iter().cloned())
                .collect(),
        };
        Ok(summarize(snapshot))
    }
}
