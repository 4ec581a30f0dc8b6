//! Evaluation pipeline: runs the stages of one résumé–job evaluation in a fixed
//! order and accumulates their outputs into an `EvaluationRun`.
//!
//! A stage failure never aborts the run. The failing stage's fields keep their
//! defaults, the error is logged on the run, and later stages proceed on
//! whatever upstream output exists.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::StageError;
use crate::evaluation::jd_parser::{parse_jd, JobRequirement};
use crate::evaluation::ranking::rank_candidate;
use crate::evaluation::recommendation::{recommend, render_summary, RecommendationReport, FALLBACK_TEXT};
use crate::evaluation::resume_parser::{parse_resume, CandidateProfile};
use crate::evaluation::scoring::{
    compute_education_score, compute_experience_score, round2, ScoreBreakdown, ScoringWeights,
};
use crate::evaluation::skill_gap::{analyze, SkillGapReport};
use crate::evaluation::ExtractionConfig;
use crate::persistence::ScorePool;
use crate::similarity::{DocumentKind, DocumentMetadata, OracleError, SearchHit, SimilarityOracle};

const SEARCH_K: usize = 20;
const MAX_SIMILAR_CANDIDATES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResumeParse,
    JobParse,
    Similarity,
    SkillGap,
    Score,
    Recommend,
    Rank,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ResumeParse => "resume_parse",
            Stage::JobParse => "job_parse",
            Stage::Similarity => "similarity",
            Stage::SkillGap => "skill_gap",
            Stage::Score => "score",
            Stage::Recommend => "recommend",
            Stage::Rank => "rank",
        }
    }

    /// Prefix used for errors raised inside the stage.
    fn error_label(self) -> &'static str {
        match self {
            Stage::ResumeParse => "Resume parsing",
            Stage::JobParse => "Job analysis",
            Stage::Similarity => "Similarity",
            Stage::SkillGap => "Skill gap",
            Stage::Score => "Scoring",
            Stage::Recommend => "Recommendation",
            Stage::Rank => "Ranking",
        }
    }
}

/// Identifiers a run is evaluated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunIds {
    pub resume_id: Uuid,
    /// Without a job id the run is not indexed as a job and ranks first.
    pub job_id: Option<Uuid>,
    pub evaluation_id: Uuid,
}

/// Result of one evaluation. Every field is populated or defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRun {
    pub resume_id: Uuid,
    pub job_id: Option<Uuid>,
    pub evaluation_id: Uuid,
    pub candidate: CandidateProfile,
    pub job: JobRequirement,
    pub semantic_score: f64,
    pub similar_candidates: Vec<SearchHit>,
    pub skill_gap: SkillGapReport,
    pub scores: ScoreBreakdown,
    pub recommendations: RecommendationReport,
    pub recommendation_text: String,
    pub rank: Option<u32>,
    pub completed_steps: Vec<Stage>,
    pub errors: Vec<String>,
}

impl EvaluationRun {
    /// Empty accumulator: every field at its default.
    pub fn new(ids: RunIds) -> Self {
        Self {
            resume_id: ids.resume_id,
            job_id: ids.job_id,
            evaluation_id: ids.evaluation_id,
            candidate: CandidateProfile::default(),
            job: JobRequirement::default(),
            semantic_score: 0.0,
            similar_candidates: Vec::new(),
            skill_gap: SkillGapReport::default(),
            scores: ScoreBreakdown::default(),
            recommendations: RecommendationReport::default(),
            recommendation_text: String::new(),
            rank: None,
            completed_steps: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Merges a stage result: `Ok` is handed to `apply` and the stage is
    /// marked complete, `Err` is appended to the error log.
    fn record<T>(&mut self, stage: Stage, result: Result<T, StageError>, apply: impl FnOnce(&mut Self, T)) {
        match result {
            Ok(value) => {
                apply(self, value);
                debug!("Evaluation {}: {} done", self.evaluation_id, stage.as_str());
                self.completed_steps.push(stage);
            }
            Err(e) => {
                warn!("Evaluation {}: {} failed: {e}", self.evaluation_id, stage.as_str());
                self.errors.push(e.to_string());
            }
        }
    }
}

struct SimilarityOutcome {
    semantic: f64,
    similar: Vec<SearchHit>,
    index_error: Option<StageError>,
}

pub struct EvaluationPipeline {
    oracle: Arc<dyn SimilarityOracle>,
    scores: Arc<dyn ScorePool>,
    config: ExtractionConfig,
    weights: ScoringWeights,
}

impl EvaluationPipeline {
    pub fn new(
        oracle: Arc<dyn SimilarityOracle>,
        scores: Arc<dyn ScorePool>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            oracle,
            scores,
            config,
            weights: ScoringWeights::default(),
        }
    }

    /// Runs every stage for one résumé–job pair. Never fails: problems show up
    /// in `errors` on an otherwise complete run.
    pub async fn evaluate(&self, resume_text: &str, job_text: &str, ids: RunIds) -> EvaluationRun {
        let mut run = EvaluationRun::new(ids);
        info!("Evaluation {}: starting", ids.evaluation_id);

        let config = self.config;
        let candidate = guarded(Stage::ResumeParse, || parse_resume(resume_text, &config));
        run.record(Stage::ResumeParse, candidate, |run, c| run.candidate = c);

        let job = guarded(Stage::JobParse, || parse_jd(job_text));
        run.record(Stage::JobParse, job, |run, j| run.job = j);

        let similarity = self.similarity_stage(&run, resume_text, job_text).await;
        run.record(Stage::Similarity, similarity, |run, outcome| {
            run.semantic_score = outcome.semantic;
            run.similar_candidates = outcome.similar;
            if let Some(e) = outcome.index_error {
                warn!("Evaluation {}: comparable candidates unavailable: {e}", run.evaluation_id);
                run.errors.push(e.to_string());
            }
        });

        let gap = guarded(Stage::SkillGap, || {
            Ok(analyze(
                &run.candidate.skills,
                &run.job.required_skills,
                &run.job.preferred_skills,
            ))
        });
        run.record(Stage::SkillGap, gap, |run, g| run.skill_gap = g);

        let scores = guarded(Stage::Score, || Ok(self.score(&run)));
        run.record(Stage::Score, scores, |run, s| run.scores = s);

        let advice = guarded(Stage::Recommend, || {
            let shortfall = (run.job.experience_required_years - run.candidate.experience_years).max(0.0);
            let report = recommend(
                &run.skill_gap,
                run.scores.overall,
                &run.candidate.skills,
                &run.job.title,
                shortfall,
            );
            let text = render_summary(&report, run.scores.overall);
            Ok((report, text))
        });
        run.record(Stage::Recommend, advice, |run, (report, text)| {
            run.recommendations = report;
            run.recommendation_text = text;
        });
        if !run.completed_steps.contains(&Stage::Recommend) {
            run.recommendation_text = FALLBACK_TEXT.to_string();
        }

        let rank = self.rank_stage(&run).await;
        run.record(Stage::Rank, rank, |run, r| run.rank = Some(r));

        info!(
            "Evaluation {}: overall={} rank={:?} errors={}",
            run.evaluation_id,
            run.scores.overall,
            run.rank,
            run.errors.len()
        );
        run
    }

    /// Scores the pair from the two embeddings, then indexes both documents
    /// and looks up comparable candidates. Index or search failures are
    /// carried in the outcome so they never cost the semantic score.
    async fn similarity_stage(
        &self,
        run: &EvaluationRun,
        resume_text: &str,
        job_text: &str,
    ) -> Result<SimilarityOutcome, StageError> {
        let resume_vec = self.embed_nonempty(resume_text).await?;
        let job_vec = self.embed_nonempty(job_text).await?;

        let semantic = match (&resume_vec, &job_vec) {
            (Some(r), Some(j)) => round2(self.oracle.similarity(r, j) * 100.0),
            _ => 0.0,
        };

        let (similar, index_error) = match self.index_and_search(run, resume_vec, job_vec).await {
            Ok(hits) => (hits, None),
            Err(e) => (Vec::new(), Some(StageError::VectorIndex(e))),
        };

        Ok(SimilarityOutcome {
            semantic,
            similar,
            index_error,
        })
    }

    async fn embed_nonempty(&self, text: &str) -> Result<Option<Vec<f32>>, OracleError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.oracle.embed(text).await.map(Some)
    }

    async fn index_and_search(
        &self,
        run: &EvaluationRun,
        resume_vec: Option<Vec<f32>>,
        job_vec: Option<Vec<f32>>,
    ) -> Result<Vec<SearchHit>, OracleError> {
        let resume_doc = format!("resume_{}", run.resume_id);

        if let Some(vector) = resume_vec {
            let metadata = DocumentMetadata {
                kind: DocumentKind::Resume,
                owner_id: run.resume_id,
                label: run.candidate.name.clone(),
                skills: run.candidate.skills.iter().cloned().collect(),
                experience_years: Some(run.candidate.experience_years),
            };
            self.oracle.index(&resume_doc, vector, metadata).await?;
        }

        let Some(job_vec) = job_vec else {
            return Ok(Vec::new());
        };
        if let Some(job_id) = run.job_id {
            let metadata = DocumentMetadata {
                kind: DocumentKind::JobDescription,
                owner_id: job_id,
                label: Some(run.job.title.clone()),
                skills: run.job.required_skills.iter().cloned().collect(),
                experience_years: None,
            };
            self.oracle.index(&format!("job_{job_id}"), job_vec.clone(), metadata).await?;
        }

        Ok(self
            .oracle
            .search(&job_vec, SEARCH_K)
            .await?
            .into_iter()
            .filter(|hit| hit.metadata.kind == DocumentKind::Resume && hit.doc_id != resume_doc)
            .take(MAX_SIMILAR_CANDIDATES)
            .collect())
    }

    fn score(&self, run: &EvaluationRun) -> ScoreBreakdown {
        let experience = compute_experience_score(
            run.candidate.experience_years,
            run.job.experience_required_years,
        );
        let education =
            compute_education_score(run.candidate.education_levels(), run.job.education_required);
        ScoreBreakdown::new(
            run.semantic_score,
            run.skill_gap.skill_match_score,
            experience,
            education,
            &self.weights,
        )
    }

    async fn rank_stage(&self, run: &EvaluationRun) -> Result<u32, StageError> {
        let Some(job_id) = run.job_id else {
            return Ok(1);
        };
        let pool = self.scores.completed_scores(job_id).await?;
        Ok(rank_candidate(run.scores.overall, run.evaluation_id, &pool))
    }
}

/// Runs a synchronous stage, turning a panic into a `StageError`.
fn guarded<T>(stage: Stage, f: impl FnOnce() -> Result<T, StageError>) -> Result<T, StageError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(StageError::Panicked {
            stage: stage.error_label(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
