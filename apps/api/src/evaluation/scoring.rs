use serde::{Deserialize, Serialize};

use crate::evaluation::taxonomy::EducationLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub skill: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.30,
            skill: 0.40,
            experience: 0.20,
            education: 0.10,
        }
    }
}

/// Four sub-scores and the weighted composite, all in [0, 100].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub semantic: f64,
    pub skill: f64,
    pub experience: f64,
    pub education: f64,
    pub overall: f64,
}

impl ScoreBreakdown {
    /// Builds the breakdown; `overall` is derived from the rounded sub-scores
    /// so the weighted-sum invariant holds exactly on the stored values.
    pub fn new(semantic: f64, skill: f64, experience: f64, education: f64, weights: &ScoringWeights) -> Self {
        let semantic = round2(semantic.clamp(0.0, 100.0));
        let skill = round2(skill.clamp(0.0, 100.0));
        let experience = round2(experience.clamp(0.0, 100.0));
        let education = round2(education.clamp(0.0, 100.0));
        Self {
            overall: compute_overall_score(semantic, skill, experience, education, weights),
            semantic,
            skill,
            experience,
            education,
        }
    }

    pub fn label(&self) -> &'static str {
        score_label(self.overall)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Experience against the requirement. With no stated requirement, extra
/// experience is still rewarded up to the cap.
pub fn compute_experience_score(candidate_years: f64, required_years: f64) -> f64 {
    if required_years <= 0.0 {
        return (75.0 + 2.5 * candidate_years).min(100.0);
    }

    let ratio = candidate_years / required_years;
    if ratio >= 1.5 {
        100.0
    } else if ratio >= 1.0 {
        90.0 + (ratio - 1.0) * 20.0
    } else if ratio >= 0.75 {
        70.0 + (ratio - 0.75) * 80.0
    } else if ratio >= 0.5 {
        40.0 + (ratio - 0.5) * 120.0
    } else {
        (ratio * 80.0).max(10.0)
    }
}

/// Candidate's highest degree against the required one.
pub fn compute_education_score<I>(candidate: I, required: EducationLevel) -> f64
where
    I: IntoIterator<Item = EducationLevel>,
{
    let best = candidate
        .into_iter()
        .map(EducationLevel::rank_score)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
    let Some(best) = best else {
        return 30.0;
    };

    let required = required.rank_score();
    if best >= required {
        100.0
    } else {
        (best / required * 80.0).max(20.0)
    }
}

/// Weighted composite, rounded to 2 decimals and capped at 100.
pub fn compute_overall_score(
    semantic: f64,
    skill: f64,
    experience: f64,
    education: f64,
    weights: &ScoringWeights,
) -> f64 {
    let overall = weights.semantic * semantic
        + weights.skill * skill
        + weights.experience * experience
        + weights.education * education;
    round2(overall).min(100.0)
}

pub fn score_label(score: f64) -> &'static str {
    if score >= 85.0 {
        "Excellent Match"
    } else if score >= 70.0 {
        "Strong Match"
    } else if score >= 55.0 {
        "Good Match"
    } else if score >= 40.0 {
        "Moderate Match"
    } else if score >= 25.0 {
        "Weak Match"
    } else {
        "Poor Match"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = ScoringWeights::default();
        assert_eq!(w.semantic, 0.30);
        assert_eq!(w.skill, 0.40);
        assert_eq!(w.experience, 0.20);
        assert_eq!(w.education, 0.10);
        assert!((w.semantic + w.skill + w.experience + w.education - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overall_weighted_sum() {
        let w = ScoringWeights::default();
        // 0.3*80 + 0.4*60 + 0.2*90 + 0.1*100 = 24 + 24 + 18 + 10 = 76
        assert_eq!(compute_overall_score(80.0, 60.0, 90.0, 100.0, &w), 76.0);
        // 0.3*33.33 + 0.4*66.67 + 0.2*12.5 + 0.1*40 = 9.999 + 26.668 + 2.5 + 4 = 43.167
        assert_eq!(compute_overall_score(33.33, 66.67, 12.5, 40.0, &w), 43.17);
    }

    #[test]
    fn test_overall_clamped_to_100() {
        let w = ScoringWeights {
            semantic: 1.0,
            skill: 1.0,
            experience: 0.0,
            education: 0.0,
        };
        assert_eq!(compute_overall_score(100.0, 100.0, 0.0, 0.0, &w), 100.0);
        let full = ScoreBreakdown::new(100.0, 100.0, 100.0, 100.0, &ScoringWeights::default());
        assert!(full.overall <= 100.0);
    }

    #[test]
    fn test_breakdown_invariant_holds_on_stored_values() {
        let w = ScoringWeights::default();
        let b = ScoreBreakdown::new(71.234, 55.555, 83.333, 100.0, &w);
        let expected = round2(0.30 * b.semantic + 0.40 * b.skill + 0.20 * b.experience + 0.10 * b.education);
        assert_eq!(b.overall, expected);
        assert_eq!(b.semantic, 71.23);
    }

    #[test]
    fn test_experience_no_requirement() {
        assert_eq!(compute_experience_score(0.0, 0.0), 75.0);
        assert_eq!(compute_experience_score(4.0, 0.0), 85.0);
        assert_eq!(compute_experience_score(20.0, 0.0), 100.0);
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_experience_segments() {
        assert_close(compute_experience_score(9.0, 5.0), 100.0);
        assert_close(compute_experience_score(6.0, 5.0), 94.0);
        assert_close(compute_experience_score(4.0, 5.0), 74.0);
        assert_close(compute_experience_score(3.0, 5.0), 52.0);
        assert_close(compute_experience_score(1.0, 5.0), 16.0);
        assert_close(compute_experience_score(0.0, 5.0), 10.0);
    }

    #[test]
    fn test_experience_continuous_at_boundaries() {
        for boundary in [0.5_f64, 0.75, 1.0, 1.5] {
            let below = compute_experience_score(boundary - 1e-9, 1.0);
            let at = compute_experience_score(boundary, 1.0);
            assert!((at - below).abs() < 1e-6, "jump at {boundary}: {below} -> {at}");
        }
    }

    #[test]
    fn test_experience_monotonic_in_ratio() {
        let mut last = 0.0;
        for step in 0..=200 {
            let ratio = step as f64 / 100.0;
            let score = compute_experience_score(ratio, 1.0);
            assert!(score >= last, "decrease at ratio {ratio}");
            last = score;
        }
    }

    #[test]
    fn test_education_meets_requirement() {
        let score = compute_education_score([EducationLevel::Masters], EducationLevel::Bachelors);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_education_below_requirement() {
        // 75 / 100 * 80 = 60
        let score = compute_education_score([EducationLevel::Bachelors], EducationLevel::PhD);
        assert_eq!(score, 60.0);
        // 30 / 100 * 80 = 24
        let score = compute_education_score([EducationLevel::HighSchool], EducationLevel::PhD);
        assert_close(score, 24.0);
    }

    #[test]
    fn test_education_uses_highest_label() {
        let score = compute_education_score(
            [EducationLevel::HighSchool, EducationLevel::Mba],
            EducationLevel::Masters,
        );
        // 85 / 90 * 80
        assert!((score - 75.5555).abs() < 0.001);
    }

    #[test]
    fn test_education_empty_candidate() {
        assert_eq!(compute_education_score(Vec::new(), EducationLevel::PhD), 30.0);
        assert_eq!(compute_education_score(Vec::new(), EducationLevel::NotSpecified), 30.0);
    }

    #[test]
    fn test_score_labels() {
        assert_eq!(score_label(90.0), "Excellent Match");
        assert_eq!(score_label(70.0), "Strong Match");
        assert_eq!(score_label(54.99), "Moderate Match");
        assert_eq!(score_label(0.0), "Poor Match");
    }
}
