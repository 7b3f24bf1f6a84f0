//! Rule-based analyzer: vocabulary matching and regex heuristics, no provider calls.
//!
//! matchScore = round(0.6·skill + 0.3·experience + 0.1·education), clamped to [0, 100].
//! Deterministic for a given current year, so every branch is unit-testable.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use tracing::info;

use super::rules::{
    education_satisfied, experience_score, extract_education, extract_job_titles, extract_skills,
    extract_years_experience, extract_years_required, match_score, partition_skills, skill_score,
};
use super::vocabulary::{
    mentions_any, COMPUTER_SCIENCE_KEYWORDS, DEGREE_STRENGTH_KEYWORDS, DESIGN_KEYWORDS,
    SENIORITY_KEYWORDS,
};
use super::{Analyzer, MatchAnalysis, ResumeInfo};
use crate::errors::AppError;

const MAX_STRENGTHS: usize = 6;
const MAX_GAPS: usize = 5;
const MAX_MISSING_SKILL_GAPS: usize = 3;
const MAX_INFO_SKILLS: usize = 15;
const SUMMARY_SKILLS: usize = 5;
const BROAD_SKILL_SET: usize = 5;

pub struct RuleBasedAnalyzer {
    /// Pinned year for the date-range fallback; `None` reads the clock.
    year: Option<i32>,
}

impl RuleBasedAnalyzer {
    pub fn new() -> Self {
        Self { year: None }
    }

    pub fn with_current_year(year: i32) -> Self {
        Self { year: Some(year) }
    }

    fn current_year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

impl Default for RuleBasedAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for RuleBasedAnalyzer {
    fn backend(&self) -> String {
        "rule-based".to_string()
    }

    async fn analyze(&self, resume: &str, job_description: &str) -> Result<MatchAnalysis, AppError> {
        let analysis = analyze_match(resume, job_description, self.current_year());
        info!(
            "Rule-based analysis complete: score={}, strengths={}, gaps={}",
            analysis.match_score,
            analysis.strengths.len(),
            analysis.gaps.len()
        );
        Ok(analysis)
    }

    async fn extract_info(&self, resume: &str) -> ResumeInfo {
        resume_info(resume, self.current_year())
    }
}

pub fn analyze_match(resume: &str, job_description: &str, current_year: i32) -> MatchAnalysis {
    let required = extract_skills(job_description);
    let (matching, missing) = partition_skills(&required, resume);

    let required_years = extract_years_required(job_description);
    let candidate_years = extract_years_experience(resume, current_year);
    let has_education = education_satisfied(resume, job_description);

    let score = match_score(
        skill_score(matching.len(), required.len()),
        experience_score(candidate_years, required_years),
        if has_education { 100.0 } else { 0.0 },
    );

    let strengths = strengths(&matching, candidate_years, &resume.to_lowercase());
    let gaps = gaps(&missing, required_years, candidate_years, has_education);
    let overall_assessment = assessment(score, strengths.len(), gaps.len());

    MatchAnalysis {
        match_score: score,
        strengths,
        gaps,
        overall_assessment,
    }
}

pub fn resume_info(resume: &str, current_year: i32) -> ResumeInfo {
    let skills = extract_skills(resume);
    let years = extract_years_experience(resume, current_year);

    let lead = if years > 0 {
        format!("{years}+ years of")
    } else {
        "Experienced".to_string()
    };
    let summary = if skills.is_empty() {
        format!("{lead} professional")
    } else {
        let top: Vec<&str> = skills.iter().take(SUMMARY_SKILLS).copied().collect();
        format!("{lead} professional with skills in {}", top.join(", "))
    };

    ResumeInfo {
        skills: skills
            .into_iter()
            .take(MAX_INFO_SKILLS)
            .map(String::from)
            .collect(),
        experience: extract_job_titles(resume),
        education: extract_education(resume),
        summary,
    }
}

fn strengths(matching: &[&str], years: u32, resume_lower: &str) -> Vec<String> {
    let mut strengths = Vec::new();

    if matching.len() >= BROAD_SKILL_SET {
        strengths.push(format!(
            "Strong technical skill set with {}",
            matching[..BROAD_SKILL_SET].join(", ")
        ));
    }

    if years >= 5 {
        strengths.push(format!("{years}+ years of professional experience"));
    } else if years >= 3 {
        strengths.push(format!("{years} years of relevant experience"));
    }

    if mentions_any(resume_lower, DEGREE_STRENGTH_KEYWORDS) {
        if mentions_any(resume_lower, COMPUTER_SCIENCE_KEYWORDS) {
            strengths.push("Computer Science degree".to_string());
        } else {
            strengths.push("University degree".to_string());
        }
    }

    if mentions_any(resume_lower, SENIORITY_KEYWORDS) {
        strengths.push("Senior-level experience".to_string());
    }

    if mentions_any(resume_lower, DESIGN_KEYWORDS) {
        strengths.push("System design and architecture experience".to_string());
    }

    strengths.truncate(MAX_STRENGTHS);
    strengths
}

fn gaps(missing: &[&str], required_years: u32, candidate_years: u32, has_education: bool) -> Vec<String> {
    let mut gaps: Vec<String> = missing
        .iter()
        .take(MAX_MISSING_SKILL_GAPS)
        .map(|skill| format!("No {skill} experience mentioned"))
        .collect();

    if required_years > 0 && candidate_years < required_years {
        gaps.push(format!(
            "Experience ({candidate_years} years) below requirement ({required_years}+ years)"
        ));
    }

    if !has_education {
        gaps.push("Education requirement not clearly met".to_string());
    }

    gaps.truncate(MAX_GAPS);
    gaps
}

fn assessment(score: u32, strengths: usize, gaps: usize) -> String {
    match score {
        80.. => format!(
            "Excellent match for this role. Candidate demonstrates {strengths} key strengths \
             with minimal gaps. Strong recommendation to proceed with interview."
        ),
        60..=79 => format!(
            "Good match for this role. Candidate shows {strengths} relevant strengths, though \
             {gaps} areas could be improved. Recommend for interview."
        ),
        40..=59 => format!(
            "Moderate match. While the candidate has {strengths} positive aspects, there are \
             {gaps} notable gaps. May be worth considering if other factors align."
        ),
        _ => format!(
            "Limited match for this role. Significant gaps identified ({gaps} areas) that may \
             impact suitability. Consider other candidates."
        ),
    }
}
