//! Résumé feature extraction: contact details, skills, experience and education.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::StageError;
use crate::evaluation::taxonomy::{categorize_skills, extract_skills, EducationLevel, SkillCategory};
use crate::evaluation::ExtractionConfig;

/// Years of experience are never credited beyond this.
pub const MAX_EXPERIENCE_YEARS: f64 = 40.0;
const MAX_EDUCATION_ENTRIES: usize = 3;
const EARLIEST_CAREER_YEAR: i32 = 1990;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: EducationLevel,
    pub field: String,
}

/// Structured view of one résumé. Built once per run and never mutated after.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: BTreeSet<String>,
    pub categorized_skills: BTreeMap<SkillCategory, Vec<String>>,
    pub experience_years: f64,
    pub education: Vec<EducationEntry>,
}

impl CandidateProfile {
    pub fn education_levels(&self) -> impl Iterator<Item = EducationLevel> + '_ {
        self.education.iter().map(|e| e.degree)
    }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
});

static NAME_SKIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)@|http|www|linkedin|github|resume|cv|curriculum").expect("valid name-skip regex")
});

static EXPERIENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+)\+?\s*years?\s+of\s+(?:work\s+)?experience",
        r"(?i)experience\s+of\s+(\d+)\+?\s*years?",
        r"(?i)(\d+)\+?\s*years?\s+(?:work|professional|industry|relevant)",
        r"(?i)(\d+)\s*-\s*(\d+)\s*years?\s+of\s+experience",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid experience regex"))
    .collect()
});

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(20\d{2}|19\d{2})\s*[-–]\s*(20\d{2}|19\d{2}|present|current|now)")
        .expect("valid date range regex")
});

/// Degree stems in scan order. Several stems map to the same label.
const DEGREE_STEMS: &[(&str, EducationLevel)] = &[
    ("phd", EducationLevel::PhD),
    ("ph.d", EducationLevel::PhD),
    ("doctorate", EducationLevel::PhD),
    ("master", EducationLevel::Masters),
    ("m.s", EducationLevel::Masters),
    ("m.sc", EducationLevel::Masters),
    ("mba", EducationLevel::Mba),
    ("bachelor", EducationLevel::Bachelors),
    ("b.s", EducationLevel::Bachelors),
    ("b.sc", EducationLevel::Bachelors),
    ("b.e", EducationLevel::Bachelors),
    ("b.tech", EducationLevel::Bachelors),
    ("b.com", EducationLevel::Bachelors),
    ("associate", EducationLevel::Associates),
    ("diploma", EducationLevel::Diploma),
    ("high school", EducationLevel::HighSchool),
    ("secondary", EducationLevel::HighSchool),
];

static FIELD_OF_STUDY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEGREE_STEMS
        .iter()
        .map(|(stem, _)| {
            let pattern = format!(
                r"(?i){}[s.]?[^.]*?(?:in|of)?\s+([A-Za-z\s]+?)(?:\.|,|\n|from|at|\d)",
                regex::escape(stem)
            );
            Regex::new(&pattern).expect("valid field-of-study regex")
        })
        .collect()
});

/// Parses raw résumé text. Empty text is reported as an error so the caller
/// can substitute an empty profile.
pub fn parse_resume(text: &str, config: &ExtractionConfig) -> Result<CandidateProfile, StageError> {
    if text.trim().is_empty() {
        return Err(StageError::EmptyInput("Resume"));
    }

    let skills = extract_skills(text);
    let categorized_skills = categorize_skills(&skills);
    let profile = CandidateProfile {
        name: extract_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
        experience_years: extract_experience_years(text, config.reference_year),
        education: extract_education(text),
        categorized_skills,
        skills,
    };

    info!(
        "Resume parsed: {} skills, {} years experience",
        profile.skills.len(),
        profile.experience_years
    );
    Ok(profile)
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Picks the candidate name from the first few non-blank lines.
pub fn extract_name(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(5)
        .collect();

    for line in &lines {
        if NAME_SKIP_RE.is_match(line) {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let has_digit = line.chars().any(|c| c.is_ascii_digit());
        if (1..=4).contains(&words.len()) && !has_digit {
            let capitalized = words
                .iter()
                .filter(|w| w.chars().count() > 1)
                .all(|w| w.chars().next().is_some_and(char::is_uppercase));
            if capitalized {
                return Some((*line).to_string());
            }
        }
    }
    lines.first().map(|l| (*l).to_string())
}

/// Explicit phrases first; otherwise the sum of employment date ranges.
/// Ranges take the upper bound: a candidate gets credit for the ceiling.
pub fn extract_experience_years(text: &str, reference_year: i32) -> f64 {
    for pattern in EXPERIENCE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let years = caps
                .iter()
                .skip(1)
                .flatten()
                .filter_map(|m| m.as_str().parse::<f64>().ok())
                .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |a| a.max(y))));
            if let Some(years) = years {
                return years.min(MAX_EXPERIENCE_YEARS);
            }
        }
    }

    let mut total = 0.0;
    for caps in DATE_RANGE_RE.captures_iter(text) {
        let Ok(start) = caps[1].parse::<i32>() else {
            continue;
        };
        let end = match caps[2].to_lowercase().as_str() {
            "present" | "current" | "now" => reference_year,
            other => match other.parse::<i32>() {
                Ok(year) => year,
                Err(_) => continue,
            },
        };
        if (EARLIEST_CAREER_YEAR..=reference_year).contains(&start) && start <= end {
            total += f64::from(end - start);
        }
    }

    if total > 0.0 {
        total.min(MAX_EXPERIENCE_YEARS)
    } else {
        0.0
    }
}

/// Degree mentions with a best-effort field of study, one entry per label,
/// at most three.
pub fn extract_education(text: &str) -> Vec<EducationEntry> {
    let lowered = text.to_lowercase();
    let mut entries: Vec<EducationEntry> = Vec::new();

    for ((stem, degree), field_re) in DEGREE_STEMS.iter().zip(FIELD_OF_STUDY_RES.iter()) {
        if !lowered.contains(stem) || entries.iter().any(|e| e.degree == *degree) {
            continue;
        }
        let field = field_re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| strip_preposition(m.as_str().trim()).to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "Not specified".to_string());
        entries.push(EducationEntry {
            degree: *degree,
            field,
        });
        if entries.len() == MAX_EDUCATION_ENTRIES {
            break;
        }
    }
    entries
}

/// The proximity regex tends to capture the linking word ("in Physics").
fn strip_preposition(field: &str) -> &str {
    let lowered = field.to_ascii_lowercase();
    if lowered.starts_with("in ") || lowered.starts_with("of ") {
        field[3..].trim_start()
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\n\
        jane.doe@example.com | +1 555-123-4567\n\
        linkedin.com/in/janedoe\n\
        \n\
        Senior backend engineer with Python, Django, PostgreSQL and AWS.\n\
        Experience\n\
        Acme Corp 2018 - 2021\n\
        Globex 2021 - present\n\
        Education\n\
        Master's in Computer Science, 2017\n";

    fn config() -> ExtractionConfig {
        ExtractionConfig { reference_year: 2024 }
    }

    #[test]
    fn test_parse_resume_full_profile() {
        let profile = parse_resume(RESUME, &config()).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
        assert_eq!(profile.email.as_deref(), Some("jane.doe@example.com"));
        assert!(profile.phone.is_some());
        assert!(profile.skills.contains("python"));
        assert!(profile.skills.contains("postgresql"));
        assert!(profile.skills.contains("aws"));
        // 2018-2021 (3) + 2021-2024 (3)
        assert_eq!(profile.experience_years, 6.0);
        assert_eq!(profile.education[0].degree, EducationLevel::Masters);
        assert_eq!(profile.education[0].field, "Computer Science");
    }

    #[test]
    fn test_parse_resume_empty_is_error() {
        let err = parse_resume("   \n ", &config()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_explicit_experience_phrase_wins() {
        let years = extract_experience_years("I have 7+ years of experience. 2000 - 2020", 2024);
        assert_eq!(years, 7.0);
    }

    #[test]
    fn test_experience_phrase_credits_upper_bound() {
        let years = extract_experience_years("3 - 5 years of experience building APIs", 2024);
        assert_eq!(years, 5.0);
    }

    #[test]
    fn test_present_range_uses_reference_year() {
        assert_eq!(extract_experience_years("Engineer, 2020 - present", 2024), 4.0);
        assert_eq!(extract_experience_years("Engineer, 2020 – Current", 2024), 4.0);
    }

    #[test]
    fn test_date_ranges_capped_at_forty() {
        let text = "1990 - 2024\n1991 - 2024\n1992 - present";
        assert_eq!(extract_experience_years(text, 2024), MAX_EXPERIENCE_YEARS);
    }

    #[test]
    fn test_date_ranges_outside_window_ignored() {
        assert_eq!(extract_experience_years("1985 - 1989", 2024), 0.0);
        assert_eq!(extract_experience_years("2022 - 2019", 2024), 0.0);
        assert_eq!(extract_experience_years("no dates here", 2024), 0.0);
    }

    #[test]
    fn test_extract_name_skips_contact_lines() {
        let text = "john@example.com\nJohn Smith\nEngineer";
        assert_eq!(extract_name(text).as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_extract_name_falls_back_to_first_line() {
        let text = "curriculum vitae 2024\nsome lowercase line here";
        assert_eq!(extract_name(text).as_deref(), Some("curriculum vitae 2024"));
    }

    #[test]
    fn test_extract_education_deduplicates_and_caps() {
        let text = "PhD in Physics. Ph.D candidate. Doctorate. MBA. Bachelor of Arts, Diploma.";
        let education = extract_education(text);
        assert_eq!(education.len(), 3);
        assert_eq!(education[0].degree, EducationLevel::PhD);
        assert_eq!(education[0].field, "Physics");
        assert_eq!(education[1].degree, EducationLevel::Mba);
        assert_eq!(education[2].degree, EducationLevel::Bachelors);
    }

    #[test]
    fn test_extract_education_none() {
        assert!(extract_education("Self-taught developer").is_empty());
    }
}
