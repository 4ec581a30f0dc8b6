//! Aggregate statistics over every persisted evaluation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::evaluation::scoring::round2;

const TOP_SKILLS: usize = 15;
const TOP_GAPS: usize = 10;

/// Raw rows an analytics read collects from a store.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsSnapshot {
    pub total_resumes: usize,
    pub total_jobs: usize,
    pub total_evaluations: usize,
    /// Overall scores of scored evaluations.
    pub scores: Vec<f64>,
    /// Required skills of every job, one entry per occurrence.
    pub required_skills: Vec<String>,
    pub resume_skills: Vec<String>,
    pub missing_required: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    #[serde(rename = "0-25")]
    pub poor: usize,
    #[serde(rename = "25-50")]
    pub fair: usize,
    #[serde(rename = "50-75")]
    pub good: usize,
    #[serde(rename = "75-100")]
    pub strong: usize,
}

impl ScoreDistribution {
    fn add(&mut self, score: f64) {
        if score < 25.0 {
            self.poor += 1;
        } else if score < 50.0 {
            self.fair += 1;
        } else if score < 75.0 {
            self.good += 1;
        } else {
            self.strong += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationAnalytics {
    pub total_resumes: usize,
    pub total_jobs: usize,
    pub total_evaluations: usize,
    pub avg_match_score: f64,
    pub score_distribution: ScoreDistribution,
    pub top_skills_demand: Vec<SkillCount>,
    pub top_skills_supply: Vec<SkillCount>,
    pub common_skill_gaps: Vec<SkillCount>,
    pub high_match_count: usize,
    pub low_match_count: usize,
}

pub fn summarize(snapshot: AnalyticsSnapshot) -> EvaluationAnalytics {
    let mut distribution = ScoreDistribution::default();
    for score in &snapshot.scores {
        distribution.add(*score);
    }
    let avg_match_score = if snapshot.scores.is_empty() {
        0.0
    } else {
        round2(snapshot.scores.iter().sum::<f64>() / snapshot.scores.len() as f64)
    };

    EvaluationAnalytics {
        total_resumes: snapshot.total_resumes,
        total_jobs: snapshot.total_jobs,
        total_evaluations: snapshot.total_evaluations,
        avg_match_score,
        high_match_count: distribution.strong,
        low_match_count: distribution.poor,
        score_distribution: distribution,
        top_skills_demand: most_common(snapshot.required_skills, TOP_SKILLS),
        top_skills_supply: most_common(snapshot.resume_skills, TOP_SKILLS),
        common_skill_gaps: most_common(snapshot.missing_required, TOP_GAPS),
    }
}

/// Highest counts first; ties break alphabetically.
fn most_common(items: Vec<String>, limit: usize) -> Vec<SkillCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    let mut ranked: Vec<SkillCount> = counts
        .into_iter()
        .map(|(skill, count)| SkillCount { skill, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_distribution_buckets_and_average() {
        let analytics = summarize(AnalyticsSnapshot {
            total_evaluations: 5,
            scores: vec![10.0, 25.0, 49.99, 75.0, 100.0],
            ..AnalyticsSnapshot::default()
        });
        assert_eq!(
            analytics.score_distribution,
            ScoreDistribution {
                poor: 1,
                fair: 2,
                good: 0,
                strong: 2
            }
        );
        assert_eq!(analytics.avg_match_score, 52.0);
        assert_eq!(analytics.high_match_count, 2);
        assert_eq!(analytics.low_match_count, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let analytics = summarize(AnalyticsSnapshot::default());
        assert_eq!(analytics.avg_match_score, 0.0);
        assert!(analytics.top_skills_demand.is_empty());
    }

    #[test]
    fn test_most_common_orders_and_truncates() {
        let ranked = most_common(strings(&["go", "aws", "go", "rust", "aws", "go"]), 2);
        assert_eq!(
            ranked,
            vec![
                SkillCount { skill: "go".to_string(), count: 3 },
                SkillCount { skill: "aws".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_distribution_serializes_with_range_keys() {
        let json = serde_json::to_value(ScoreDistribution::default()).unwrap();
        assert_eq!(json["75-100"], 0);
        assert_eq!(json["0-25"], 0);
    }
}
