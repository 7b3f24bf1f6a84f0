//! Analysis Engine — scores a resume against a job description.
//!
//! Two backends share the `Analyzer` trait: `RuleBasedAnalyzer` (vocabulary tables
//! and regex rules, fully offline) and `LlmAnalyzer` (prompted JSON extraction via a
//! `CompletionProvider`). `AppState` holds an `Arc<dyn Analyzer>` chosen from
//! `AI_PROVIDER` at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub mod heuristic;
pub mod llm;
pub mod prompts;
pub mod rules;
pub mod vocabulary;

pub use heuristic::RuleBasedAnalyzer;
pub use llm::LlmAnalyzer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    /// 0 – 100
    pub match_score: u32,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub overall_assessment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeInfo {
    pub skills: Vec<String>,
    /// Job titles, most prominent first.
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub summary: String,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Label reported by the health endpoint.
    fn backend(&self) -> String;

    async fn analyze(&self, resume: &str, job_description: &str) -> Result<MatchAnalysis, AppError>;

    /// Best-effort; backends return a placeholder instead of failing.
    async fn extract_info(&self, resume: &str) -> ResumeInfo;
}
