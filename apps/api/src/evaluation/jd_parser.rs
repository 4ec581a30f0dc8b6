//! JD parser: extracts title, skills, experience and education requirements
//! from a raw job description.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::StageError;
use crate::evaluation::taxonomy::{extract_skills, EducationLevel, SOFT_SKILLS};

pub const UNSPECIFIED_TITLE: &str = "Position Not Specified";
const MAX_TITLE_CHARS: usize = 100;

const ROLE_SUFFIXES: &str = "engineer|developer|analyst|scientist|architect|manager|designer|\
    representative|assistant|specialist|lead|consultant|director|officer|coordinator|intern|\
    associate|executive|administrator|technician|operator|supervisor|advisor|strategist";

/// Structured requirements of one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub title: String,
    pub all_skills: BTreeSet<String>,
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    /// 0.0 means the posting states no requirement.
    pub experience_required_years: f64,
    pub education_required: EducationLevel,
    pub soft_skills: BTreeSet<String>,
}

impl Default for JobRequirement {
    fn default() -> Self {
        Self {
            title: UNSPECIFIED_TITLE.to_string(),
            all_skills: BTreeSet::new(),
            required_skills: BTreeSet::new(),
            preferred_skills: BTreeSet::new(),
            experience_required_years: 0.0,
            education_required: EducationLevel::NotSpecified,
            soft_skills: BTreeSet::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

/// Contact info, addresses, section headers and punctuation-only lines.
static SKIP_LINE: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"[\w.-]+@[\w.-]+\.\w+",
        r"\+?\d[\d\s\-()]{7,}",
        r"https?://\S+",
        r"(?i)\b(?:pincode|zip|address|location|office|remote|city|state|country)\b",
        r"(?i)\b(?:about\s+(?:us|the\s+company)|benefits|responsibilities|requirements|qualifications|overview)\b",
        r"^[0-9\W]+$",
    ])
    .expect("valid skip-line patterns")
});

static LABEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:job\s+title|position(?:\s+title)?|role|opening)[:\s]+(.{3,80})$")
        .expect("valid label regex")
});

static ROLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^((?:senior|junior|lead|principal|staff|associate|mid[\s-]level|entry[\s-]level|chief)?\s*[\w\s\-/]+?(?:{ROLE_SUFFIXES})[\w\s\-/]{{0,30}})"
    ))
    .expect("valid role-line regex")
});

static HIRING_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:seeking|looking\s+for|hiring(?:\s+an?)?|we\s+are\s+hiring\s*[:\-,]?\s*(?:an?)?|role\s+(?:of|is)|position\s+(?:of|is))\s+((?:senior|junior|lead|principal)?\s*[\w\s\-/]{{3,60}}?(?:{ROLE_SUFFIXES}))"
    ))
    .expect("valid hiring-phrase regex")
});

/// Deliberately case-sensitive: leading words must be capitalized.
static CAPITALIZED_ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b((?:[A-Z][a-zA-Z\-]{{1,20}}\s+){{0,4}}(?:{ROLE_SUFFIXES}))\b"
    ))
    .expect("valid capitalized-role regex")
});

static GENERIC_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(job\s+description|job\s+post(?:ing)?|career|opportunity|vacancy|advertisement|about\s+the\s+role|role\s+summary)\b",
    )
    .expect("valid generic-heading regex")
});

static EXPERIENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+)\+?\s*years?\s+of\s+(?:relevant\s+)?experience\s+(?:required|preferred)",
        r"(?i)(?:minimum|at\s+least|minimum\s+of)\s+(\d+)\+?\s*years?",
        r"(?i)(\d+)\+?\s*years?\s+(?:in|of|with)",
        r"(?i)(\d+)\s*-\s*(\d+)\s*years?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid experience regex"))
    .collect()
});

/// Highest degree first; the first hit is the requirement. Word boundaries keep
/// "teams" or "kubernetes" from reading as degree abbreviations.
static EDUCATION_PATTERNS: Lazy<Vec<(Regex, EducationLevel)>> = Lazy::new(|| {
    [
        (r"\b(?:ph\.?d|doctorate)\b", EducationLevel::PhD),
        (r"\b(?:master'?s?|m\.s|mba)\b", EducationLevel::Masters),
        (r"\b(?:bachelor'?s?|b\.s|b\.e|b\.tech)\b", EducationLevel::Bachelors),
        (r"\bassociate'?s?\b", EducationLevel::Associates),
        (r"\b(?:high\s+school|secondary)\b", EducationLevel::HighSchool),
    ]
    .into_iter()
    .map(|(p, level)| (Regex::new(p).expect("valid education regex"), level))
    .collect()
});

static REQUIRED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)required|must\s+have|mandatory|essential").expect("valid marker regex")
});

static REQUIRED_END_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)preferred|nice\s+to\s+have|desired").expect("valid marker regex")
});

static PREFERRED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)preferred|nice\s+to\s+have|desired|bonus|plus").expect("valid marker regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Parses a raw job description into a `JobRequirement`.
pub fn parse_jd(text: &str) -> Result<JobRequirement, StageError> {
    if text.trim().is_empty() {
        return Err(StageError::EmptyInput("Job description"));
    }

    let title = extract_job_title(text);
    let all_skills = extract_skills(text);
    let (required_skills, preferred_skills) = separate_required_preferred(text, &all_skills);
    let requirement = JobRequirement {
        title,
        required_skills,
        preferred_skills,
        experience_required_years: extract_experience_requirement(text),
        education_required: extract_education_requirement(text),
        soft_skills: extract_soft_skills(text),
        all_skills,
    };

    info!(
        "Job parsed: title='{}', {} skills, {} yrs required",
        requirement.title,
        requirement.all_skills.len(),
        requirement.experience_required_years
    );
    Ok(requirement)
}

fn truncate_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_CHARS).collect()
}

/// Progressive title strategies; each falls through to the next on a miss.
pub fn extract_job_title(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    // 1. "Job Title: ..." style label
    for line in lines.iter().take(20) {
        if let Some(caps) = LABEL_LINE.captures(line) {
            return truncate_title(&caps[1]);
        }
    }

    // 2. line shaped like a role
    for line in lines.iter().take(30) {
        if SKIP_LINE.is_match(line) {
            continue;
        }
        if let Some(caps) = ROLE_LINE.captures(line) {
            let title = caps[1].trim();
            if title.chars().count() <= 80 {
                return truncate_title(title);
            }
        }
    }

    // 3. "we are hiring a ..." / "seeking a ..."
    let head = char_prefix(text, 3000);
    if let Some(caps) = HIRING_PHRASE.captures(head) {
        return truncate_title(&caps[1]);
    }

    // 4. capitalized role phrase anywhere near the top
    let head = char_prefix(text, 2000);
    if let Some(caps) = CAPITALIZED_ROLE.captures(head) {
        let candidate = caps[1].trim();
        let len = candidate.chars().count();
        if len > 3 && len <= 80 {
            return truncate_title(candidate);
        }
    }

    // 5. first short, clean line
    for line in lines.iter().take(20) {
        if SKIP_LINE.is_match(line) || GENERIC_HEADING.is_match(line) {
            continue;
        }
        if (3..=70).contains(&line.chars().count()) {
            return truncate_title(line);
        }
    }

    UNSPECIFIED_TITLE.to_string()
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First matching pattern wins. A bare range ("3-6 years") takes the lower
/// bound, but "3-5 years of" hits the "N years of" pattern first and reads 5.
pub fn extract_experience_requirement(text: &str) -> f64 {
    for pattern in EXPERIENCE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let years = caps
                .iter()
                .skip(1)
                .flatten()
                .filter_map(|m| m.as_str().parse::<f64>().ok())
                .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |a| a.min(y))));
            if let Some(years) = years {
                return years;
            }
        }
    }
    0.0
}

pub fn extract_education_requirement(text: &str) -> EducationLevel {
    let lowered = text.to_lowercase();
    EDUCATION_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lowered))
        .map(|(_, level)| *level)
        .unwrap_or(EducationLevel::NotSpecified)
}

/// Splits `skills` into (required, preferred).
///
/// The required span starts at the first required-style marker and stops at
/// the next preferred-style marker. The preferred span runs from the first
/// preferred-style marker to the end. A skill is preferred only when it appears
/// verbatim in the preferred span; everything else counts as required.
pub fn separate_required_preferred(
    text: &str,
    skills: &BTreeSet<String>,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let required_span = match REQUIRED_MARKER.find(text) {
        Some(start) => {
            let end = REQUIRED_END_MARKER
                .find_at(text, start.end())
                .map_or(text.len(), |m| m.start());
            &text[start.start()..end]
        }
        None => text,
    }
    .to_lowercase();
    let preferred_span = PREFERRED_MARKER
        .find(text)
        .map(|m| text[m.start()..].to_lowercase())
        .unwrap_or_default();

    let mut required = BTreeSet::new();
    let mut preferred = BTreeSet::new();
    for skill in skills {
        let skill_lower = skill.to_lowercase();
        if !preferred_span.is_empty() && preferred_span.contains(&skill_lower) {
            preferred.insert(skill_lower);
        } else if required_span.contains(&skill_lower) {
            required.insert(skill_lower);
        } else {
            // Ambiguous skills count as required.
            required.insert(skill_lower);
        }
    }
    (required, preferred)
}

pub fn extract_soft_skills(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    SOFT_SKILLS
        .iter()
        .filter(|s| lowered.contains(*s))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTUP_JD: &str = "Senior Rust Engineer\n\
        We move fast and own everything end-to-end.\n\
        Requirements: 5+ years of experience required with Rust, Docker and PostgreSQL.\n\
        Bachelor's degree in Computer Science.\n\
        Nice to have: Kubernetes, Kafka.\n\
        Strong communication and leadership.";

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_jd_full_requirement() {
        let jd = parse_jd(STARTUP_JD).unwrap();
        assert_eq!(jd.title, "Senior Rust Engineer");
        assert_eq!(jd.experience_required_years, 5.0);
        assert_eq!(jd.education_required, EducationLevel::Bachelors);
        assert!(jd.required_skills.contains("rust"));
        assert!(jd.required_skills.contains("docker"));
        assert!(jd.required_skills.contains("postgresql"));
        assert_eq!(jd.preferred_skills, set(&["kubernetes"]));
        assert!(jd.soft_skills.contains("communication"));
        assert!(jd.soft_skills.contains("leadership"));
    }

    #[test]
    fn test_parse_jd_empty_is_error() {
        let err = parse_jd("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_default_requirement_uses_sentinel_title() {
        let jd = JobRequirement::default();
        assert_eq!(jd.title, UNSPECIFIED_TITLE);
        assert_eq!(jd.education_required, EducationLevel::NotSpecified);
        assert_eq!(jd.experience_required_years, 0.0);
    }

    #[test]
    fn test_title_from_label() {
        let text = "Job Title: Senior Data Scientist\nWe build models.";
        assert_eq!(extract_job_title(text), "Senior Data Scientist");
    }

    #[test]
    fn test_title_label_beats_role_line() {
        let text = "Backend Developer\nPosition: Platform Engineer";
        assert_eq!(extract_job_title(text), "Platform Engineer");
    }

    #[test]
    fn test_title_from_role_line_skips_contact() {
        let text = "hr@acme.io\nStaff Machine Learning Engineer\nGreat team.";
        assert_eq!(extract_job_title(text), "Staff Machine Learning Engineer");
    }

    #[test]
    fn test_title_from_hiring_phrase() {
        let text = "Acme Corp is growing fast, and after a long search the company is now actively \
            hiring a senior data analyst to join its finance group in the coming quarter.";
        assert_eq!(extract_job_title(text), "senior data analyst");
    }

    #[test]
    fn test_title_from_capitalized_role_phrase() {
        // The comma defeats the role-line match; role suffixes are lowercase only.
        let text = "Acme, Inc. needs a Platform engineer (hybrid) to build internal tooling \
            for the rest of the company over the coming year.";
        assert_eq!(extract_job_title(text), "Platform engineer");
        assert!(CAPITALIZED_ROLE.captures("needs a Platform Engineer").is_none());
    }

    #[test]
    fn test_title_from_first_short_line() {
        let text = "Acme Widgets\nThis is a long description line that goes on and on without a role noun in it.";
        assert_eq!(extract_job_title(text), "Acme Widgets");
    }

    #[test]
    fn test_title_sentinel_when_nothing_matches() {
        let text = "Job description and careers opportunity at our growing company today\n\
            This posting is a very long line that contains absolutely nothing of use at all here.";
        assert_eq!(extract_job_title(text), UNSPECIFIED_TITLE);
    }

    #[test]
    fn test_title_truncated_to_100_chars() {
        let long = format!("Job Title: {}", "x".repeat(79));
        assert_eq!(extract_job_title(&long).chars().count(), 79);
        assert!(truncate_title(&"y".repeat(150)).chars().count() == MAX_TITLE_CHARS);
    }

    #[test]
    fn test_experience_requirement_patterns() {
        assert_eq!(extract_experience_requirement("5+ years of experience required"), 5.0);
        assert_eq!(extract_experience_requirement("A minimum of 3 years in backend work"), 3.0);
        assert_eq!(extract_experience_requirement("Looking for 3-6 years"), 3.0);
        assert_eq!(extract_experience_requirement("No requirement stated"), 0.0);
    }

    #[test]
    fn test_range_followed_by_of_reads_upper_bound() {
        assert_eq!(extract_experience_requirement("3-5 years of experience"), 5.0);
        assert_eq!(extract_experience_requirement("3-5 years"), 3.0);
    }

    #[test]
    fn test_education_requirement_highest_priority_wins() {
        assert_eq!(
            extract_education_requirement("Bachelor's required, PhD a plus"),
            EducationLevel::PhD
        );
        assert_eq!(
            extract_education_requirement("MBA or equivalent"),
            EducationLevel::Masters
        );
        assert_eq!(
            extract_education_requirement("No formal degree needed"),
            EducationLevel::NotSpecified
        );
    }

    #[test]
    fn test_education_requirement_ignores_embedded_abbreviations() {
        assert_eq!(
            extract_education_requirement("Work with platform teams on kubernetes. Bachelor's preferred."),
            EducationLevel::Bachelors
        );
    }

    #[test]
    fn test_separation_defaults_to_required() {
        let skills = set(&["python", "docker"]);
        let (required, preferred) = separate_required_preferred("We use python and docker.", &skills);
        assert_eq!(required, skills);
        assert!(preferred.is_empty());
    }

    #[test]
    fn test_separation_sets_are_disjoint() {
        let text = "Must have: python, aws. Preferred: aws certification, terraform.";
        let skills = set(&["python", "aws", "terraform"]);
        let (required, preferred) = separate_required_preferred(text, &skills);
        assert_eq!(required, set(&["python"]));
        assert_eq!(preferred, set(&["aws", "terraform"]));
        assert!(required.is_disjoint(&preferred));
    }
}
