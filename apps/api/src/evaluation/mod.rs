//! Résumé–job evaluation: feature extraction, skill gap analysis, weighted
//! scoring, recommendations and ranking, orchestrated by `pipeline::EvaluationPipeline`.

pub mod analytics;
pub mod handlers;
pub mod jd_parser;
pub mod pipeline;
pub mod ranking;
pub mod recommendation;
pub mod resume_parser;
pub mod scoring;
pub mod skill_gap;
pub mod taxonomy;

/// Knobs for the heuristic extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Year that "present" / "current" resolves to in date ranges.
    pub reference_year: i32,
}
