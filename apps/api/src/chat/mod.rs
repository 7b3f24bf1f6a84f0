//! Conversation Manager — retrieval-grounded Q&A with bounded per-conversation history.
//!
//! query: retrieve top-5 chunks for the session → render the grounding context →
//! answer through the configured `Responder` → record the exchange.
//!
//! Each conversation has its own async mutex, held for the whole query, so parallel
//! questions on one conversation append in a total order. Different conversations
//! only share the brief map lookup.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::documents::chunker::ChunkType;
use crate::errors::AppError;
use crate::llm_client::ChatMessage;
use crate::search::{SearchFilter, SearchIndex, SearchResult};

pub mod handlers;
pub mod history;
pub mod prompts;
pub mod responder;
pub mod templates;

pub use history::ConversationHistory;
pub use responder::{AnswerRequest, LlmResponder, Responder, TemplateResponder};

pub const RETRIEVAL_TOP_K: usize = 5;

/// One retrieved chunk used to ground an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub text: String,
    pub score: f64,
    pub chunk_type: ChunkType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub conversation_id: String,
}

type SharedHistory = Arc<Mutex<ConversationHistory>>;

pub struct ConversationManager {
    index: Arc<dyn SearchIndex>,
    responder: Arc<dyn Responder>,
    conversations: Mutex<HashMap<String, SharedHistory>>,
}

/// `[Source i] (Relevance: x.x%)` blocks separated by blank lines.
pub fn build_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return templates::NO_RESULTS_ANSWER.to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[Source {}] (Relevance: {:.1}%)\n{}", i + 1, r.score * 100.0, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn rag_failure(reason: impl std::fmt::Display) -> AppError {
    AppError::Provider(format!("RAG query failed: {reason}"))
}

impl ConversationManager {
    pub fn new(index: Arc<dyn SearchIndex>, responder: Arc<dyn Responder>) -> Self {
        Self {
            index,
            responder,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn responder_backend(&self) -> String {
        self.responder.backend()
    }

    async fn conversation(&self, conversation_id: &str) -> SharedHistory {
        self.conversations
            .lock()
            .await
            .entry(conversation_id.to_string())
            .or_default()
            .clone()
    }

    pub async fn query(
        &self,
        question: &str,
        session_id: &str,
        conversation_id: &str,
    ) -> Result<RagResponse, AppError> {
        let conversation = self.conversation(conversation_id).await;
        let mut history = conversation.lock().await;

        let filter = SearchFilter::session(session_id);
        let results = self
            .index
            .search(question, RETRIEVAL_TOP_K, Some(&filter))
            .await
            .map_err(rag_failure)?;
        let context = build_context(&results);

        let prior = history.to_vec();
        let answer = self
            .responder
            .answer(AnswerRequest {
                question,
                context: &context,
                results: &results,
                history: &prior,
            })
            .await
            .map_err(rag_failure)?;

        history.record_exchange(question, &answer);
        info!(
            "Answered question for conversation {conversation_id} from {} sources ({} messages in history)",
            results.len(),
            history.len()
        );

        Ok(RagResponse {
            answer,
            sources: results
                .into_iter()
                .map(|r| SourceRef {
                    text: r.text,
                    score: r.score,
                    chunk_type: r.metadata.chunk_type,
                })
                .collect(),
            conversation_id: conversation_id.to_string(),
        })
    }

    /// Returns whether a conversation existed.
    pub async fn clear_conversation(&self, conversation_id: &str) -> bool {
        self.conversations
            .lock()
            .await
            .remove(conversation_id)
            .is_some()
    }

    /// Oldest first; empty for unknown ids.
    pub async fn history(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let conversation = self.conversations.lock().await.get(conversation_id).cloned();
        match conversation {
            Some(history) => history.lock().await.to_vec(),
            None => Vec::new(),
        }
    }

    /// Snapshot of every conversation.
    pub async fn all_conversations(&self) -> HashMap<String, Vec<ChatMessage>> {
        let entries: Vec<(String, SharedHistory)> = self
            .conversations
            .lock()
            .await
            .iter()
            .map(|(id, history)| (id.clone(), history.clone()))
            .collect();

        let mut snapshot = HashMap::with_capacity(entries.len());
        for (id, history) in entries {
            snapshot.insert(id, history.lock().await.to_vec());
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::chunker::TextChunker;
    use crate::llm_client::tests::ScriptedProvider;
    use crate::search::KeywordIndex;

    const RESUME: &str =
        "5 years of experience in React, Node.js, AWS. Bachelor of Science in Computer Science.";

    async fn indexed(session_id: &str, text: &str) -> Arc<dyn SearchIndex> {
        let index = Arc::new(KeywordIndex::new());
        let chunks = TextChunker::default().chunk_document(text, "resume");
        index.add_documents(session_id, &chunks).await.unwrap();
        index
    }

    fn template_manager(index: Arc<dyn SearchIndex>) -> ConversationManager {
        ConversationManager::new(index, Arc::new(TemplateResponder))
    }

    #[tokio::test]
    async fn test_years_question_is_answered_from_resume() {
        let manager = template_manager(indexed("s1", RESUME).await);
        let response = manager
            .query("How many years of experience do they have?", "s1", "s1")
            .await
            .unwrap();

        assert!(response.answer.contains("5 years"), "{}", response.answer);
        assert_eq!(response.conversation_id, "s1");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].text, RESUME);
    }

    #[tokio::test]
    async fn test_history_is_bounded_and_fifo() {
        let manager = template_manager(indexed("s1", RESUME).await);
        for i in 0..6 {
            manager
                .query(&format!("Question {i} about experience"), "s1", "c1")
                .await
                .unwrap();
            assert!(manager.history("c1").await.len() <= history::HISTORY_CAPACITY);
        }

        let history = manager.history("c1").await;
        assert_eq!(history.len(), history::HISTORY_CAPACITY);
        assert!(history
            .iter()
            .all(|m| m.content != "Question 0 about experience"));
        assert_eq!(history[0].content, "Question 1 about experience");
    }

    #[tokio::test]
    async fn test_no_results_uses_fallback_context() {
        let manager = template_manager(indexed("s1", RESUME).await);
        let response = manager.query("What about Kotlin?", "other-session", "c1").await.unwrap();
        assert_eq!(response.answer, templates::NO_RESULTS_ANSWER);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_llm_responder_receives_context_and_history() {
        let provider = Arc::new(ScriptedProvider::replying("They have five years."));
        let manager = ConversationManager::new(
            indexed("s1", RESUME).await,
            Arc::new(LlmResponder::new(provider.clone())),
        );

        manager.query("years of experience?", "s1", "c1").await.unwrap();
        manager.query("And their education?", "s1", "c1").await.unwrap();

        let calls = provider.recorded();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].system.contains("[Source 1] (Relevance: "));
        assert!(calls[0].history.is_empty());
        assert_eq!(
            calls[1].history,
            vec![
                ChatMessage::user("years of experience?"),
                ChatMessage::assistant("They have five years.")
            ]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_is_wrapped() {
        let manager = ConversationManager::new(
            indexed("s1", RESUME).await,
            Arc::new(LlmResponder::new(Arc::new(ScriptedProvider::failing()))),
        );
        let err = manager.query("years?", "s1", "c1").await.unwrap_err();
        assert!(err.to_string().contains("RAG query failed"));
        assert!(manager.history("c1").await.is_empty());
    }

    #[tokio::test]
    async fn test_parallel_queries_on_one_conversation_all_land() {
        let manager = Arc::new(template_manager(indexed("s1", RESUME).await));
        let (a, b) = tokio::join!(
            manager.query("experience one", "s1", "c1"),
            manager.query("experience two", "s1", "c1")
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(manager.history("c1").await.len(), 4);
    }

    #[tokio::test]
    async fn test_clear_and_snapshot() {
        let manager = template_manager(indexed("s1", RESUME).await);
        manager.query("experience?", "s1", "c1").await.unwrap();
        manager.query("experience?", "s1", "c2").await.unwrap();

        let all = manager.all_conversations().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all["c1"].len(), 2);

        assert!(manager.clear_conversation("c1").await);
        assert!(!manager.clear_conversation("c1").await);
        assert!(manager.history("c1").await.is_empty());
        assert_eq!(manager.all_conversations().await.len(), 1);
    }

    #[test]
    fn test_build_context_format() {
        use crate::search::EntryMetadata;
        let result = |text: &str, score: f64| SearchResult {
            text: text.to_string(),
            score,
            metadata: EntryMetadata {
                chunk_type: ChunkType::Content,
                chunk_index: 0,
                source: "resume".to_string(),
                resume_id: "s1".to_string(),
            },
        };
        let context = build_context(&[result("Rust", 0.876), result("Go", 0.5)]);
        assert_eq!(context, "[Source 1] (Relevance: 87.6%)\nRust\n\n[Source 2] (Relevance: 50.0%)\nGo");
        assert_eq!(build_context(&[]), templates::NO_RESULTS_ANSWER);
    }
}
