//! Recommendations: template guidance built from the skill gap, the overall
//! score and the experience shortfall of one evaluation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::evaluation::jd_parser::UNSPECIFIED_TITLE;
use crate::evaluation::scoring::score_label;
use crate::evaluation::skill_gap::{GapPriority, SkillGapReport};

const MAX_REQUIRED_RECOMMENDATIONS: usize = 5;
const MAX_PREFERRED_RECOMMENDATIONS: usize = 3;
const MAX_STRENGTHS: usize = 8;
const MAX_QUICK_WINS: usize = 3;
const MAX_TEXT_CHARS: usize = 200;

/// Text stored when the stage fails.
pub const FALLBACK_TEXT: &str = "Unable to generate recommendations.";

const LEARNING_RESOURCES: &[(&str, &str)] = &[
    ("python", "Python.org Tutorial | Python for Data Science Handbook"),
    ("javascript", "MDN Web Docs | freeCodeCamp JavaScript Certificate"),
    ("react", "Official React Docs (react.dev) | Scrimba React Course"),
    ("aws", "AWS Training (aws.amazon.com/training) | AWS Certified Solutions Architect"),
    ("docker", "Docker Getting Started | Docker & Kubernetes Udemy Course"),
    ("kubernetes", "kubernetes.io/docs | CKAD or CKA Certification"),
    ("machine learning", "fast.ai | Andrew Ng ML Specialization on Coursera"),
    ("deep learning", "fast.ai Deep Learning | MIT 6.S191 (YouTube)"),
    ("nlp", "Hugging Face Course (huggingface.co/learn) | Stanford CS224N"),
    ("sql", "Mode Analytics SQL Tutorial | LeetCode SQL Practice"),
    ("postgresql", "PostgreSQL Official Docs | PostgreSQL Tutorial (postgresqltutorial.com)"),
    ("mongodb", "MongoDB University Free Courses"),
    ("tensorflow", "TensorFlow Official Tutorials | DeepLearning.AI TF Certificate"),
    ("pytorch", "PyTorch Official Tutorials | Fast.ai Libraries"),
    ("langchain", "LangChain Python Docs | LangChain Academy"),
    ("git", "Pro Git Book (git-scm.com) | GitHub Learning Lab"),
    ("agile", "Scrum.org | PMI Agile Certified Practitioner (PMI-ACP)"),
];

const PRIORITY_CERTS: &[(&str, &str)] = &[
    ("aws", "AWS Certified Cloud Practitioner → Solutions Architect"),
    ("azure", "AZ-900: Azure Fundamentals → AZ-104"),
    ("gcp", "Google Cloud Associate Cloud Engineer"),
    ("kubernetes", "CKA (Certified Kubernetes Administrator)"),
    ("machine learning", "Google Professional ML Engineer | AWS ML Specialty"),
    ("python", "PCEP/PCAP Python Institute Certifications"),
    ("data science", "IBM Data Science Professional Certificate"),
    ("agile", "CSM (Certified Scrum Master) | PMI-ACP"),
    ("devops", "Docker Certified Associate | Jenkins Certification"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub priority: GapPriority,
    pub action: String,
    pub resources: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub skill: String,
    pub certification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPhase {
    pub phase: String,
    pub focus: String,
    pub outcome: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub overall_action: String,
    pub score_label: String,
    pub recommendations: Vec<Recommendation>,
    pub certifications: Vec<Certification>,
    pub learning_paths: Vec<LearningPhase>,
    pub strengths: Vec<String>,
    /// First few high-priority recommendations.
    pub quick_wins: Vec<Recommendation>,
}

/// Builds recommendations for one evaluation. `experience_gap` is the
/// shortfall in years, zero when the candidate meets the requirement.
pub fn recommend(
    gap: &SkillGapReport,
    overall_score: f64,
    candidate_skills: &BTreeSet<String>,
    job_title: &str,
    experience_gap: f64,
) -> RecommendationReport {
    let job_title = display_title(job_title);
    let missing_required: Vec<&str> = gap.missing_required.iter().map(String::as_str).collect();
    let missing_preferred: Vec<&str> = gap.missing_preferred.iter().map(String::as_str).collect();

    let mut recommendations: Vec<Recommendation> = missing_required
        .iter()
        .take(MAX_REQUIRED_RECOMMENDATIONS)
        .map(|skill| Recommendation {
            skill: skill.to_string(),
            priority: GapPriority::High,
            action: format!("Acquire {skill} skills to meet core job requirements"),
            resources: learning_resource(skill),
        })
        .collect();
    recommendations.extend(missing_preferred.iter().take(MAX_PREFERRED_RECOMMENDATIONS).map(|skill| {
        Recommendation {
            skill: skill.to_string(),
            priority: GapPriority::Medium,
            action: format!("Consider learning {skill} to strengthen your profile"),
            resources: learning_resource(skill),
        }
    }));

    let certifications = missing_required
        .iter()
        .chain(missing_preferred.iter())
        .filter_map(|skill| {
            lookup(PRIORITY_CERTS, skill).map(|cert| Certification {
                skill: skill.to_string(),
                certification: cert.to_string(),
            })
        })
        .collect();

    let mut learning_paths = Vec::new();
    if missing_required.len() > 3 {
        learning_paths.push(LearningPhase {
            phase: "Immediate (0-3 months)".to_string(),
            focus: format!("Master top priority skills: {}", missing_required[..3].join(", ")),
            outcome: "Become eligible for entry-level positions with this role".to_string(),
        });
        let next = &missing_required[3..missing_required.len().min(6)];
        learning_paths.push(LearningPhase {
            phase: "Short-term (3-6 months)".to_string(),
            focus: format!("Expand to: {}", next.join(", ")),
            outcome: "Become a strong candidate for this role".to_string(),
        });
    }

    if experience_gap > 0.0 {
        recommendations.push(Recommendation {
            skill: "Experience".to_string(),
            priority: GapPriority::Medium,
            action: format!(
                "Build {experience_gap:.1} more years of relevant experience through projects or open source"
            ),
            resources: "GitHub projects, Kaggle competitions, freelance work".to_string(),
        });
    }

    let quick_wins = recommendations
        .iter()
        .filter(|r| r.priority == GapPriority::High)
        .take(MAX_QUICK_WINS)
        .cloned()
        .collect();

    RecommendationReport {
        overall_action: overall_action(overall_score, &job_title),
        score_label: score_label(overall_score).to_string(),
        recommendations,
        certifications,
        learning_paths,
        strengths: candidate_skills.iter().take(MAX_STRENGTHS).cloned().collect(),
        quick_wins,
    }
}

/// Markdown summary of a report.
pub fn render_summary(report: &RecommendationReport, overall_score: f64) -> String {
    let strengths = if report.strengths.is_empty() {
        "No specific tech strengths detected".to_string()
    } else {
        report.strengths.join(", ")
    };

    let gaps = if report.recommendations.is_empty() {
        "No critical skill gaps identified".to_string()
    } else {
        report
            .recommendations
            .iter()
            .take(MAX_REQUIRED_RECOMMENDATIONS)
            .map(|r| {
                format!(
                    "• **{}** (Priority: {}): {}",
                    r.skill,
                    priority_label(r.priority),
                    r.action
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let certifications = if report.certifications.is_empty() {
        "N/A".to_string()
    } else {
        report
            .certifications
            .iter()
            .take(3)
            .map(|c| format!("• {}", c.certification))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let path = if report.learning_paths.is_empty() {
        "Current skills are well-aligned with the role.".to_string()
    } else {
        report
            .learning_paths
            .iter()
            .map(|p| format!("**{}**: {}", p.phase, p.focus))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "## Candidate Evaluation Summary\n\n\
         **Match Score**: {overall_score:.1}/100 - {label}\n\n\
         {action}\n\n\
         ### Key Strengths\n{strengths}\n\n\
         ### Top Priority Skill Gaps\n{gaps}\n\n\
         ### Recommended Certifications\n{certifications}\n\n\
         ### Learning Path\n{path}",
        label = report.score_label,
        action = clean_text(&report.overall_action),
    )
}

fn overall_action(score: f64, job_title: &str) -> String {
    if score >= 85.0 {
        format!("🌟 Excellent candidate for {job_title}! Strongly recommend moving to the interview stage.")
    } else if score >= 70.0 {
        format!("✅ Strong candidate for {job_title}. Recommend for technical interview.")
    } else if score >= 55.0 {
        format!("👍 Reasonable match for {job_title}. Consider for preliminary interview to assess soft skills.")
    } else if score >= 40.0 {
        format!("⚠️ Moderate match for {job_title}. Candidate needs skill development before being interview-ready.")
    } else {
        format!("❌ Significant skill gaps for {job_title}. Recommend skill development before applying.")
    }
}

fn display_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() || title == UNSPECIFIED_TITLE {
        "the position".to_string()
    } else {
        clean_text(title)
    }
}

fn priority_label(priority: GapPriority) -> &'static str {
    match priority {
        GapPriority::High => "HIGH",
        GapPriority::Medium => "MEDIUM",
    }
}

fn lookup(table: &[(&str, &'static str)], skill: &str) -> Option<&'static str> {
    let skill = skill.to_lowercase();
    table.iter().find(|(key, _)| *key == skill).map(|(_, value)| *value)
}

fn learning_resource(skill: &str) -> String {
    lookup(LEARNING_RESOURCES, skill)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Search 'learn {skill} online' for resources"))
}

/// Collapses letter-spaced text ("S e n i o r" -> "Senior") when spaces make
/// up most of it, then caps the length.
fn clean_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let spaces = chars.iter().filter(|c| **c == ' ').count();
    let is_word = |i: usize| chars.get(i).is_some_and(|c| c.is_alphanumeric() || *c == '_');

    let cleaned: Vec<char> = if spaces > 0 && chars.len() < spaces * 3 {
        chars
            .iter()
            .enumerate()
            .filter(|&(i, c)| {
                let lone_letter_gap = *c == ' '
                    && i >= 1
                    && is_word(i - 1)
                    && (i < 2 || !is_word(i - 2))
                    && is_word(i + 1)
                    && !is_word(i + 2);
                !lone_letter_gap
            })
            .map(|(_, c)| *c)
            .collect()
    } else {
        chars
    };

    if cleaned.len() > MAX_TEXT_CHARS {
        let mut capped: String = cleaned[..MAX_TEXT_CHARS].iter().collect();
        capped.push_str("...");
        capped
    } else {
        cleaned.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::skill_gap::analyze;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_high_and_medium_priorities() {
        let gap = analyze(
            &set(&["python"]),
            &set(&["python", "aws", "docker"]),
            &set(&["kubernetes"]),
        );
        let report = recommend(&gap, 62.0, &set(&["python"]), "Cloud Engineer", 0.0);

        let skills: Vec<(&str, GapPriority)> = report
            .recommendations
            .iter()
            .map(|r| (r.skill.as_str(), r.priority))
            .collect();
        assert_eq!(
            skills,
            vec![
                ("aws", GapPriority::High),
                ("docker", GapPriority::High),
                ("kubernetes", GapPriority::Medium)
            ]
        );
        assert_eq!(report.recommendations[1].resources, "Docker Getting Started | Docker & Kubernetes Udemy Course");
        assert_eq!(report.quick_wins.len(), 2);
        assert_eq!(report.score_label, "Good Match");
        assert!(report.overall_action.contains("Reasonable match for Cloud Engineer"));
    }

    #[test]
    fn test_caps_and_unknown_resource() {
        let required = set(&["aws", "docker", "go", "java", "kotlin", "rust", "scala"]);
        let gap = analyze(&set(&[]), &required, &set(&["agile", "git", "nlp", "sql"]));
        let report = recommend(&gap, 10.0, &set(&[]), "", 0.0);

        let high = report.recommendations.iter().filter(|r| r.priority == GapPriority::High).count();
        let medium = report.recommendations.iter().filter(|r| r.priority == GapPriority::Medium).count();
        assert_eq!((high, medium), (5, 3));
        assert_eq!(report.quick_wins.len(), 3);
        let go = report.recommendations.iter().find(|r| r.skill == "go").unwrap();
        assert_eq!(go.resources, "Search 'learn go online' for resources");
        assert!(report.overall_action.ends_with("Recommend skill development before applying."));
        assert!(report.overall_action.contains("for the position"));
    }

    #[test]
    fn test_certifications_cover_required_and_preferred() {
        let gap = analyze(&set(&[]), &set(&["aws", "react"]), &set(&["kubernetes"]));
        let report = recommend(&gap, 30.0, &set(&[]), "Platform Engineer", 0.0);
        let certs: Vec<&str> = report.certifications.iter().map(|c| c.skill.as_str()).collect();
        assert_eq!(certs, vec!["aws", "kubernetes"]);
    }

    #[test]
    fn test_learning_path_needs_more_than_three_missing() {
        let gap = analyze(&set(&[]), &set(&["aws", "docker", "go"]), &set(&[]));
        assert!(recommend(&gap, 20.0, &set(&[]), "x", 0.0).learning_paths.is_empty());

        let gap = analyze(&set(&[]), &set(&["aws", "docker", "go", "java", "kotlin", "rust", "scala"]), &set(&[]));
        let paths = recommend(&gap, 20.0, &set(&[]), "x", 0.0).learning_paths;
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].focus, "Master top priority skills: aws, docker, go");
        assert_eq!(paths[1].focus, "Expand to: java, kotlin, rust");
    }

    #[test]
    fn test_experience_gap_adds_medium_recommendation() {
        let gap = analyze(&set(&["python"]), &set(&["python"]), &set(&[]));
        let report = recommend(&gap, 90.0, &set(&["python"]), "Data Engineer", 2.5);
        let last = report.recommendations.last().unwrap();
        assert_eq!(last.skill, "Experience");
        assert_eq!(last.priority, GapPriority::Medium);
        assert!(last.action.starts_with("Build 2.5 more years"));
        assert!(report.quick_wins.is_empty());
    }

    #[test]
    fn test_strengths_capped_at_eight() {
        let skills = set(&["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9"]);
        let gap = analyze(&skills, &set(&[]), &set(&[]));
        let report = recommend(&gap, 50.0, &skills, "x", 0.0);
        assert_eq!(report.strengths.len(), MAX_STRENGTHS);
    }

    #[test]
    fn test_summary_sections() {
        let gap = analyze(&set(&["python"]), &set(&["python", "aws"]), &set(&[]));
        let report = recommend(&gap, 72.5, &set(&["python"]), "Backend Developer", 0.0);
        let text = render_summary(&report, 72.5);

        assert!(text.starts_with("## Candidate Evaluation Summary"));
        assert!(text.contains("**Match Score**: 72.5/100 - Strong Match"));
        assert!(text.contains("### Key Strengths\npython"));
        assert!(text.contains("• **aws** (Priority: HIGH): Acquire aws skills"));
        assert!(text.contains("• AWS Certified Cloud Practitioner"));
        assert!(text.ends_with("Current skills are well-aligned with the role."));
    }

    #[test]
    fn test_summary_placeholders_when_nothing_to_say() {
        let gap = analyze(&set(&[]), &set(&[]), &set(&[]));
        let text = render_summary(&recommend(&gap, 0.0, &set(&[]), "x", 0.0), 0.0);
        assert!(text.contains("No specific tech strengths detected"));
        assert!(text.contains("No critical skill gaps identified"));
        assert!(text.contains("### Recommended Certifications\nN/A"));
    }

    #[test]
    fn test_clean_text_collapses_letter_spacing() {
        assert_eq!(clean_text("D a t a"), "Data");
        assert_eq!(clean_text("Data Engineer"), "Data Engineer");
        let long = "x".repeat(250);
        assert_eq!(clean_text(&long).chars().count(), MAX_TEXT_CHARS + 3);
    }
}
