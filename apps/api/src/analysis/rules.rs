//! Extraction rules used by the rule-based analyzer.
//!
//! Every rule is a pure function over text; none of them allocate state or call out.

use std::sync::LazyLock;

use regex::Regex;

use super::vocabulary::{mentions_any, JD_EDUCATION_KEYWORDS, RESUME_DEGREE_KEYWORDS, SKILL_VOCABULARY};

pub const SKILL_WEIGHT: f64 = 0.6;
pub const EXPERIENCE_WEIGHT: f64 = 0.3;
pub const EDUCATION_WEIGHT: f64 = 0.1;

/// Skill score used when the job description names no known skill.
pub const NEUTRAL_SKILL_SCORE: f64 = 50.0;
/// Experience score when some years are required but none are found.
pub const NO_EXPERIENCE_SCORE: f64 = 30.0;

pub const MAX_JOB_TITLES: usize = 3;

static YEARS_REQUIRED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\+?\s*(?:years?|yrs?)").expect("years pattern is valid")
});

static YEARS_EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\+?\s*(?:years?|yrs?)\s*(?:of\s+)?(?:experience|exp)")
        .expect("experience pattern is valid")
});

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{4})\s*-\s*(?:present|\d{4})").expect("date range pattern is valid")
});

static BACHELOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bachelor[^.\n]*").expect("bachelor pattern is valid"));
static BS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bb\.?s\.?\s+[^.\n]*").expect("b.s. pattern is valid"));
static MASTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)master[^.\n]*").expect("master pattern is valid"));
static MS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bm\.?s\.?\s+[^.\n]*").expect("m.s. pattern is valid"));

static JOB_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:senior|lead|staff|junior)?\s*(?:software|full[\s-]?stack|backend|frontend|web)\s*(?:engineer|developer)",
    )
    .expect("job title pattern is valid")
});

/// Vocabulary skills mentioned anywhere in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .copied()
        .filter(|skill| lower.contains(skill))
        .collect()
}

/// Splits `required` into (present in resume, absent from resume).
pub fn partition_skills<'a>(
    required: &[&'a str],
    resume: &str,
) -> (Vec<&'a str>, Vec<&'a str>) {
    let lower = resume.to_lowercase();
    required.iter().copied().partition(|skill| lower.contains(skill))
}

/// First "N years"/"N+ yrs" figure in the job description; 0 when absent.
pub fn extract_years_required(jd: &str) -> u32 {
    first_number(&YEARS_REQUIRED_RE, jd).unwrap_or(0)
}

/// Stated years of experience, else years since the earliest dated role, else 0.
pub fn extract_years_experience(resume: &str, current_year: i32) -> u32 {
    if let Some(years) = first_number(&YEARS_EXPERIENCE_RE, resume) {
        return years;
    }

    DATE_RANGE_RE
        .captures_iter(resume)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .min()
        .map(|start| u32::try_from(current_year - start).unwrap_or(0))
        .unwrap_or(0)
}

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text).and_then(|c| c[1].parse().ok())
}

pub fn skill_score(matching: usize, required: usize) -> f64 {
    if required == 0 {
        return NEUTRAL_SKILL_SCORE;
    }
    100.0 * matching as f64 / required as f64
}

pub fn experience_score(candidate_years: u32, required_years: u32) -> f64 {
    if required_years == 0 || candidate_years >= required_years {
        100.0
    } else if candidate_years == 0 {
        NO_EXPERIENCE_SCORE
    } else {
        (100.0 * candidate_years as f64 / required_years as f64).round()
    }
}

/// False only when the job description asks for a degree and the resume mentions none.
pub fn education_satisfied(resume: &str, jd: &str) -> bool {
    !mentions_any(&jd.to_lowercase(), JD_EDUCATION_KEYWORDS)
        || mentions_any(&resume.to_lowercase(), RESUME_DEGREE_KEYWORDS)
}

/// Weighted sum of the three component scores, rounded into [0, 100].
pub fn match_score(skill: f64, experience: f64, education: f64) -> u32 {
    let score = SKILL_WEIGHT * skill + EXPERIENCE_WEIGHT * experience + EDUCATION_WEIGHT * education;
    score.round().clamp(0.0, 100.0) as u32
}

/// At most one bachelor-level and one master-level line.
pub fn extract_education(resume: &str) -> Vec<String> {
    [[&*BACHELOR_RE, &*BS_RE], [&*MASTER_RE, &*MS_RE]]
        .iter()
        .filter_map(|patterns| {
            patterns
                .iter()
                .find_map(|re| re.find(resume))
                .map(|m| m.as_str().trim().to_string())
        })
        .collect()
}

pub fn extract_job_titles(resume: &str) -> Vec<String> {
    JOB_TITLE_RE
        .find_iter(resume)
        .map(|m| m.as_str().trim().to_string())
        .take(MAX_JOB_TITLES)
        .collect()
}
