//! Skill gap analysis: measures a candidate's skills against required and
//! preferred skills, with partial credit for equivalent technologies.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::evaluation::scoring::round2;
use crate::evaluation::taxonomy::{equivalent_credit, SkillCategory, SKILL_TAXONOMY};

const REQUIRED_WEIGHT: f64 = 0.7;
const PREFERRED_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    High,
    Medium,
}

/// Missing skills of one taxonomy category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGap {
    pub skills: Vec<String>,
    pub count: usize,
    pub priority: GapPriority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub matched_required: BTreeSet<String>,
    pub matched_preferred: BTreeSet<String>,
    pub missing_required: BTreeSet<String>,
    pub missing_preferred: BTreeSet<String>,
    /// Missing required skills covered by an equivalent skill.
    pub partial_matches: BTreeSet<String>,
    pub skill_match_score: f64,
    pub required_match_pct: f64,
    pub preferred_match_pct: f64,
    pub gap_categories: BTreeMap<SkillCategory, CategoryGap>,
    pub summary: String,
}

/// Compares candidate skills against the job's required and preferred skills.
///
/// `required_score = (matched + 0.5 * partial_credit) / max(required, 1)`
/// `preferred_score = matched / max(preferred, 1)`
/// `skill_match_score = min(100 * (0.7 * required_score + 0.3 * preferred_score), 100)`
pub fn analyze(
    candidate_skills: &BTreeSet<String>,
    required_skills: &BTreeSet<String>,
    preferred_skills: &BTreeSet<String>,
) -> SkillGapReport {
    let candidate = lowercase_set(candidate_skills);
    let required = lowercase_set(required_skills);
    let preferred = lowercase_set(preferred_skills);

    let matched_required: BTreeSet<String> = required.intersection(&candidate).cloned().collect();
    let missing_required: BTreeSet<String> = required.difference(&candidate).cloned().collect();
    let matched_preferred: BTreeSet<String> = preferred.intersection(&candidate).cloned().collect();
    let missing_preferred: BTreeSet<String> = preferred.difference(&candidate).cloned().collect();

    let mut partial_credit = 0.0;
    let mut partial_matches = BTreeSet::new();
    for skill in &missing_required {
        let credit = equivalent_credit(skill, &candidate);
        if credit > 0.0 {
            partial_credit += credit;
            partial_matches.insert(skill.clone());
        }
    }

    let total_required = required.len().max(1) as f64;
    let total_preferred = preferred.len().max(1) as f64;

    let required_score = (matched_required.len() as f64 + 0.5 * partial_credit) / total_required;
    let preferred_score = matched_preferred.len() as f64 / total_preferred;
    let raw = (REQUIRED_WEIGHT * required_score + PREFERRED_WEIGHT * preferred_score) * 100.0;
    let skill_match_score = round2(raw.min(100.0));

    let required_match_pct = round1(matched_required.len() as f64 / total_required * 100.0);
    let preferred_match_pct = round1(matched_preferred.len() as f64 / total_preferred * 100.0);

    let gap_categories = group_gaps_by_category(&missing_required, &missing_preferred);
    let summary = format!(
        "Candidate matches {required_match_pct:.1}% of required skills and {preferred_match_pct:.1}% of preferred skills."
    );

    SkillGapReport {
        matched_required,
        matched_preferred,
        missing_required,
        missing_preferred,
        partial_matches,
        skill_match_score,
        required_match_pct,
        preferred_match_pct,
        gap_categories,
        summary,
    }
}

/// Buckets missing skills by taxonomy category. A bucket holding any missing
/// required skill is high priority.
pub fn group_gaps_by_category(
    missing_required: &BTreeSet<String>,
    missing_preferred: &BTreeSet<String>,
) -> BTreeMap<SkillCategory, CategoryGap> {
    let mut categories = BTreeMap::new();
    for (category, members) in SKILL_TAXONOMY {
        let skills: Vec<String> = missing_required
            .iter()
            .chain(missing_preferred.iter())
            .filter(|s| members.contains(&s.as_str()))
            .cloned()
            .collect();
        if skills.is_empty() {
            continue;
        }
        let priority = if skills.iter().any(|s| missing_required.contains(s)) {
            GapPriority::High
        } else {
            GapPriority::Medium
        };
        categories.insert(
            *category,
            CategoryGap {
                count: skills.len(),
                skills,
                priority,
            },
        );
    }
    categories
}

fn lowercase_set(skills: &BTreeSet<String>) -> BTreeSet<String> {
    skills.iter().map(|s| s.to_lowercase()).collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
