//! LLM analyzer: prompts a completion provider for JSON and coerces the reply.
//!
//! Provider failures on `analyze` are surfaced; malformed replies are not. Anything
//! the model gets wrong in the JSON is replaced by a safe default so the response
//! shape always holds (score in [0, 100], arrays present, assessment non-empty).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::prompts::{ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM, EXTRACT_PROMPT_TEMPLATE, EXTRACT_SYSTEM};
use super::{Analyzer, MatchAnalysis, ResumeInfo};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, EVIDENCE_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_json, parse_json_reply, CompletionProvider};

pub const FALLBACK_SCORE: u32 = 50;
pub const FALLBACK_ASSESSMENT: &str =
    "Analysis completed, but the model did not return an overall assessment.";
pub const PLACEHOLDER_SUMMARY: &str = "Resume information could not be extracted.";

pub struct LlmAnalyzer {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmAnalyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

fn system_prompt(role: &str) -> String {
    format!("{role} {EVIDENCE_INSTRUCTION} {JSON_ONLY_INSTRUCTION}")
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    fn backend(&self) -> String {
        format!("llm:{}", self.provider.model())
    }

    async fn analyze(&self, resume: &str, job_description: &str) -> Result<MatchAnalysis, AppError> {
        let prompt = fill_template(
            ANALYZE_PROMPT_TEMPLATE,
            &[("resume", resume), ("job_description", job_description)],
        );
        let reply = self
            .provider
            .complete(&system_prompt(ANALYZE_SYSTEM), &[], &prompt)
            .await
            .map_err(|e| AppError::Provider(format!("Failed to analyze resume match: {e}")))?;

        let analysis = match parse_json_reply::<Value>(&reply) {
            Ok(value) => coerce_analysis(&value),
            Err(e) => {
                warn!("Analysis reply was not valid JSON, using defaults: {e}");
                coerce_analysis(&Value::Null)
            }
        };
        info!(
            "LLM analysis complete (model: {}): score={}",
            self.provider.model(),
            analysis.match_score
        );
        Ok(analysis)
    }

    async fn extract_info(&self, resume: &str) -> ResumeInfo {
        let prompt = fill_template(EXTRACT_PROMPT_TEMPLATE, &[("resume", resume)]);
        match complete_json::<Value>(self.provider.as_ref(), &system_prompt(EXTRACT_SYSTEM), &prompt).await {
            Ok(value) => coerce_resume_info(&value),
            Err(e) => {
                warn!("Resume info extraction failed, returning placeholder: {e}");
                placeholder_info()
            }
        }
    }
}

/// Builds a `MatchAnalysis` from whatever JSON the model produced.
pub fn coerce_analysis(value: &Value) -> MatchAnalysis {
    MatchAnalysis {
        match_score: coerce_score(value.get("matchScore")),
        strengths: string_list(value.get("strengths")),
        gaps: string_list(value.get("gaps")),
        overall_assessment: non_empty_text(value.get("overallAssessment"))
            .unwrap_or_else(|| FALLBACK_ASSESSMENT.to_string()),
    }
}

pub fn coerce_resume_info(value: &Value) -> ResumeInfo {
    ResumeInfo {
        skills: string_list(value.get("skills")),
        experience: string_list(value.get("experience")),
        education: string_list(value.get("education")),
        summary: non_empty_text(value.get("summary"))
            .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string()),
    }
}

fn placeholder_info() -> ResumeInfo {
    ResumeInfo {
        skills: Vec::new(),
        experience: Vec::new(),
        education: Vec::new(),
        summary: PLACEHOLDER_SUMMARY.to_string(),
    }
}

/// Number or numeric string, rounded and clamped; anything else is the fallback.
fn coerce_score(value: Option<&Value>) -> u32 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(score) if score.is_finite() => score.round().clamp(0.0, 100.0) as u32,
        _ => FALLBACK_SCORE,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::tests::ScriptedProvider;
    use serde_json::json;

    #[test]
    fn test_coerce_score_variants() {
        assert_eq!(coerce_score(Some(&json!(72.6))), 73);
        assert_eq!(coerce_score(Some(&json!(" 85 "))), 85);
        assert_eq!(coerce_score(Some(&json!(140))), 100);
        assert_eq!(coerce_score(Some(&json!(-3))), 0);
        assert_eq!(coerce_score(Some(&json!("high"))), FALLBACK_SCORE);
        assert_eq!(coerce_score(Some(&json!(null))), FALLBACK_SCORE);
        assert_eq!(coerce_score(None), FALLBACK_SCORE);
    }

    #[test]
    fn test_coerce_analysis_drops_non_strings() {
        let analysis = coerce_analysis(&json!({
            "matchScore": "64",
            "strengths": ["React", 5, null, "  ", "AWS"],
            "gaps": "Docker",
            "overallAssessment": ""
        }));
        assert_eq!(analysis.match_score, 64);
        assert_eq!(analysis.strengths, vec!["React", "AWS"]);
        assert!(analysis.gaps.is_empty());
        assert_eq!(analysis.overall_assessment, FALLBACK_ASSESSMENT);
    }

    #[test]
    fn test_coerce_analysis_from_non_object() {
        let analysis = coerce_analysis(&json!([1, 2, 3]));
        assert_eq!(analysis.match_score, FALLBACK_SCORE);
        assert!(analysis.strengths.is_empty());
        assert!(!analysis.overall_assessment.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_parses_fenced_reply() {
        let provider = Arc::new(ScriptedProvider::replying(
            "```json\n{\"matchScore\": 82, \"strengths\": [\"React\"], \"gaps\": [], \
             \"overallAssessment\": \"Strong fit.\"}\n```",
        ));
        let analyzer = LlmAnalyzer::new(provider.clone());
        let analysis = analyzer.analyze("resume body", "jd body").await.unwrap();

        assert_eq!(analysis.match_score, 82);
        assert_eq!(analysis.strengths, vec!["React"]);
        assert_eq!(analysis.overall_assessment, "Strong fit.");

        let calls = provider.recorded();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].user_message.contains("resume body"));
        assert!(calls[0].user_message.contains("jd body"));
        assert!(calls[0].system.contains("valid JSON only"));
    }

    #[tokio::test]
    async fn test_placeholder_text_inside_documents_is_sent_verbatim() {
        let provider = Arc::new(ScriptedProvider::replying("{\"matchScore\": 60}"));
        let analyzer = LlmAnalyzer::new(provider.clone());
        analyzer
            .analyze("Rust engineer", "Paste your {resume} into the form")
            .await
            .unwrap();

        let calls = provider.recorded();
        let prompt = &calls[0].user_message;
        assert!(prompt.contains("Paste your {resume} into the form"));
        assert_eq!(prompt.matches("Rust engineer").count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_recovers_from_prose() {
        let analyzer = LlmAnalyzer::new(Arc::new(ScriptedProvider::replying("I think they fit.")));
        let analysis = analyzer.analyze("r", "j").await.unwrap();
        assert_eq!(analysis.match_score, FALLBACK_SCORE);
        assert_eq!(analysis.overall_assessment, FALLBACK_ASSESSMENT);
    }

    #[tokio::test]
    async fn test_analyze_surfaces_provider_failure() {
        let analyzer = LlmAnalyzer::new(Arc::new(ScriptedProvider::failing()));
        let err = analyzer.analyze("r", "j").await.unwrap_err();
        assert!(matches!(&err, AppError::Provider(msg) if msg.contains("model overloaded")));
    }

    #[tokio::test]
    async fn test_extract_info_never_fails() {
        let analyzer = LlmAnalyzer::new(Arc::new(ScriptedProvider::failing()));
        let info = analyzer.extract_info("r").await;
        assert!(info.skills.is_empty());
        assert_eq!(info.summary, PLACEHOLDER_SUMMARY);

        let analyzer = LlmAnalyzer::new(Arc::new(ScriptedProvider::replying(
            r#"{"skills": ["Rust", 1], "summary": "Backend engineer."}"#,
        )));
        let info = analyzer.extract_info("r").await;
        assert_eq!(info.skills, vec!["Rust"]);
        assert!(info.education.is_empty());
        assert_eq!(info.summary, "Backend engineer.");
    }

    #[test]
    fn test_backend_label_names_model() {
        let analyzer = LlmAnalyzer::new(Arc::new(ScriptedProvider::replying("{}")));
        assert_eq!(analyzer.backend(), "llm:scripted");
    }
}
