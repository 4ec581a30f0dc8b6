//! Static skill catalog, equivalence groups and the education ladder.
//!
//! Everything here is immutable data built once on first use. Extractors and
//! the gap analyzer read it; nothing writes to it at runtime.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Technology domain a canonical skill belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    Frameworks,
    Databases,
    Cloud,
    AiMl,
    Methodologies,
    Tools,
}

/// Category → canonical skill names. A skill may appear in more than one
/// category (e.g. "langchain").
pub const SKILL_TAXONOMY: &[(SkillCategory, &[&str])] = &[
    (
        SkillCategory::Programming,
        &[
            "python", "javascript", "typescript", "java", "c++", "c#", "go", "rust", "ruby",
            "php", "swift", "kotlin", "scala", "r", "matlab", "perl", "bash", "powershell",
            "sql", "nosql", "html", "css", "sass", "less",
        ],
    ),
    (
        SkillCategory::Frameworks,
        &[
            "react", "angular", "vue", "next.js", "nuxt.js", "django", "flask", "fastapi",
            "spring", "spring boot", "express", "node.js", "laravel", "asp.net", "rails",
            "tensorflow", "pytorch", "keras", "scikit-learn", "pandas", "numpy", "opencv",
            "langchain", "langgraph", "huggingface",
        ],
    ),
    (
        SkillCategory::Databases,
        &[
            "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "cassandra",
            "dynamodb", "firebase", "sqlite", "oracle", "sql server", "mariadb", "neo4j",
            "influxdb", "clickhouse", "snowflake", "bigquery",
        ],
    ),
    (
        SkillCategory::Cloud,
        &[
            "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "k8s", "terraform",
            "ansible", "jenkins", "gitlab ci", "github actions", "circleci", "cloudformation",
            "helm", "istio", "prometheus", "grafana",
        ],
    ),
    (
        SkillCategory::AiMl,
        &[
            "machine learning", "deep learning", "nlp", "computer vision",
            "natural language processing", "llm", "gpt", "bert", "transformers",
            "neural network", "reinforcement learning", "data science", "analytics",
            "statistics", "regression", "classification", "clustering", "embedding",
            "vector database", "faiss", "chroma", "rag", "langchain", "openai",
        ],
    ),
    (
        SkillCategory::Methodologies,
        &[
            "agile", "scrum", "kanban", "devops", "ci/cd", "tdd", "bdd", "microservices",
            "rest api", "graphql", "grpc", "event-driven", "design patterns", "solid",
            "clean architecture", "ddd",
        ],
    ),
    (
        SkillCategory::Tools,
        &[
            "git", "github", "gitlab", "bitbucket", "jira", "confluence", "slack", "figma",
            "postman", "swagger", "linux", "unix", "vim", "visual studio", "vscode",
            "intellij", "eclipse", "xcode",
        ],
    ),
];

/// If a candidate holds one member of a group, any other member earns partial credit.
pub const SKILL_EQUIVALENTS: &[(&str, &[&str])] = &[
    ("react", &["angular", "vue", "next.js"]),
    ("pytorch", &["tensorflow", "keras"]),
    ("aws", &["azure", "gcp"]),
    ("postgresql", &["mysql", "oracle", "sqlite"]),
    ("mongodb", &["dynamodb", "firebase", "nosql"]),
    ("docker", &["kubernetes"]),
    ("python", &["r", "julia"]),
    ("javascript", &["typescript"]),
];

pub const SOFT_SKILLS: &[&str] = &[
    "communication",
    "teamwork",
    "leadership",
    "problem-solving",
    "critical thinking",
    "adaptability",
    "creativity",
    "time management",
    "collaboration",
    "interpersonal",
    "presentation",
    "analytical",
    "attention to detail",
    "self-motivated",
    "proactive",
    "mentoring",
    "project management",
    "stakeholder management",
];

/// One compiled whole-word matcher per distinct canonical skill.
static SKILL_MATCHERS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let unique: BTreeSet<&'static str> = SKILL_TAXONOMY
        .iter()
        .flat_map(|(_, skills)| skills.iter().copied())
        .collect();
    unique
        .into_iter()
        .map(|skill| {
            let pattern = whole_word_pattern(skill);
            let regex = Regex::new(&pattern).expect("skill pattern is a valid regex");
            (skill, regex)
        })
        .collect()
});

/// `\b` only asserts a boundary between word and non-word characters, so it is
/// placed only on edges where the skill itself starts/ends with a word
/// character. Otherwise "c++" could never match before whitespace.
fn whole_word_pattern(skill: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut pattern = String::from("(?i)");
    match skill.chars().next() {
        Some(c) if is_word(c) => pattern.push_str(r"\b"),
        _ => pattern.push_str(r"(?:^|[^\w])"),
    }
    pattern.push_str(&regex::escape(skill));
    match skill.chars().last() {
        Some(c) if is_word(c) => pattern.push_str(r"\b"),
        _ => pattern.push_str(r"(?:$|[^\w])"),
    }
    pattern
}

/// Returns every canonical skill that occurs as a whole word in `text`.
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    SKILL_MATCHERS
        .iter()
        .filter(|(_, regex)| regex.is_match(&lowered))
        .map(|(skill, _)| (*skill).to_string())
        .collect()
}

/// Groups `skills` by every taxonomy category they belong to.
pub fn categorize_skills<'a, I>(skills: I) -> BTreeMap<SkillCategory, Vec<String>>
where
    I: IntoIterator<Item = &'a String> + Clone,
{
    let mut grouped = BTreeMap::new();
    for (category, members) in SKILL_TAXONOMY {
        let matched: Vec<String> = skills
            .clone()
            .into_iter()
            .filter(|s| members.contains(&s.as_str()))
            .cloned()
            .collect();
        if !matched.is_empty() {
            grouped.insert(*category, matched);
        }
    }
    grouped
}

/// Partial credit (0.5) when the candidate holds another member of a group
/// containing `skill`, else 0.0.
pub fn equivalent_credit(skill: &str, candidate_skills: &BTreeSet<String>) -> f64 {
    let skill = skill.to_lowercase();
    for (head, rest) in SKILL_EQUIVALENTS {
        let group = std::iter::once(*head).chain(rest.iter().copied());
        if !group.clone().any(|member| member == skill) {
            continue;
        }
        if group
            .filter(|member| *member != skill)
            .any(|member| candidate_skills.contains(member))
        {
            return 0.5;
        }
    }
    0.0
}

/// Degree labels recognised by both extractors and the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum EducationLevel {
    #[serde(rename = "PhD")]
    PhD,
    #[serde(rename = "Master's")]
    Masters,
    #[serde(rename = "MBA")]
    Mba,
    #[serde(rename = "Bachelor's")]
    Bachelors,
    #[serde(rename = "Associate's")]
    Associates,
    #[serde(rename = "Diploma")]
    Diploma,
    #[serde(rename = "High School")]
    HighSchool,
    #[default]
    #[serde(rename = "Not specified")]
    NotSpecified,
}

impl EducationLevel {
    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::PhD => "PhD",
            EducationLevel::Masters => "Master's",
            EducationLevel::Mba => "MBA",
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Associates => "Associate's",
            EducationLevel::Diploma => "Diploma",
            EducationLevel::HighSchool => "High School",
            EducationLevel::NotSpecified => "Not specified",
        }
    }

    /// Fixed rank score used by the education sub-score.
    pub fn rank_score(self) -> f64 {
        match self {
            EducationLevel::PhD => 100.0,
            EducationLevel::Masters => 90.0,
            EducationLevel::Mba => 85.0,
            EducationLevel::Bachelors => 75.0,
            EducationLevel::Associates => 60.0,
            EducationLevel::Diploma => 50.0,
            EducationLevel::HighSchool => 30.0,
            EducationLevel::NotSpecified => 40.0,
        }
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_skills_whole_word_only() {
        let skills = extract_skills("Built services in Rust and Go; trusted by many.");
        assert!(skills.contains("rust"));
        assert!(skills.contains("go"));
        assert!(!skills.contains("r"));

        let skills = extract_skills("A trusted, gopher-friendly team");
        assert!(!skills.contains("rust"));
    }

    #[test]
    fn test_extract_skills_case_insensitive_multiword() {
        let skills = extract_skills("Experienced in MACHINE LEARNING and Spring Boot.");
        assert!(skills.contains("machine learning"));
        assert!(skills.contains("spring boot"));
        assert!(skills.contains("spring"));
    }

    #[test]
    fn test_extract_skills_symbol_edges() {
        let skills = extract_skills("Languages: C++, C#, Node.js");
        assert!(skills.contains("c++"));
        assert!(skills.contains("c#"));
        assert!(skills.contains("node.js"));
    }

    #[test]
    fn test_extract_skills_empty_text() {
        assert!(extract_skills("").is_empty());
    }

    #[test]
    fn test_categorize_skills_multi_category() {
        let skills = set(&["langchain", "python"]);
        let grouped = categorize_skills(&skills);
        assert_eq!(grouped[&SkillCategory::Programming], vec!["python".to_string()]);
        assert!(grouped[&SkillCategory::Frameworks].contains(&"langchain".to_string()));
        assert!(grouped[&SkillCategory::AiMl].contains(&"langchain".to_string()));
        assert!(!grouped.contains_key(&SkillCategory::Tools));
    }

    #[test]
    fn test_equivalent_credit_within_group() {
        assert_eq!(equivalent_credit("react", &set(&["vue"])), 0.5);
        assert_eq!(equivalent_credit("azure", &set(&["aws"])), 0.5);
        assert_eq!(equivalent_credit("Kubernetes", &set(&["docker"])), 0.5);
    }

    #[test]
    fn test_equivalent_credit_none() {
        assert_eq!(equivalent_credit("react", &set(&["django"])), 0.0);
        assert_eq!(equivalent_credit("terraform", &set(&["aws"])), 0.0);
    }

    #[test]
    fn test_education_rank_scores() {
        assert_eq!(EducationLevel::PhD.rank_score(), 100.0);
        assert_eq!(EducationLevel::Mba.rank_score(), 85.0);
        assert_eq!(EducationLevel::NotSpecified.rank_score(), 40.0);
        assert_eq!(EducationLevel::HighSchool.rank_score(), 30.0);
    }

    #[test]
    fn test_education_level_serde_labels() {
        let json = serde_json::to_string(&EducationLevel::Masters).unwrap();
        assert_eq!(json, r#""Master's""#);
        let level: EducationLevel = serde_json::from_str(r#""Not specified""#).unwrap();
        assert_eq!(level, EducationLevel::NotSpecified);
    }
}
