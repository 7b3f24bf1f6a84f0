//! Search Index — per-session chunk storage with top-K relevance queries.
//!
//! Two strategies share one trait: `KeywordIndex` (TF-IDF-like term scoring, no
//! provider calls) and `VectorIndex` (cosine similarity over provider embeddings).
//! `AppState` holds an `Arc<dyn SearchIndex>` chosen at startup.
//!
//! Nothing is persisted; the index lives as long as the process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::documents::chunker::{ChunkType, TextChunk};

pub mod keyword;
pub mod vector;

pub use keyword::KeywordIndex;
pub use vector::VectorIndex;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("embedding has {got} dimensions, index expects {expected}")]
    Dimension { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub chunk_type: ChunkType,
    pub chunk_index: usize,
    pub source: String,
    pub resume_id: String,
}

/// Chunk text plus the metadata every index entry carries.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub text: String,
    pub metadata: EntryMetadata,
}

impl IndexedChunk {
    /// Tags a chunk with the session that owns it.
    pub fn new(chunk: &TextChunk, session_id: &str) -> Self {
        Self {
            text: chunk.text.clone(),
            metadata: EntryMetadata {
                chunk_type: chunk.metadata.chunk_type,
                chunk_index: chunk.index,
                source: chunk.metadata.source.clone(),
                resume_id: session_id.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f64,
    pub metadata: EntryMetadata,
}

/// Restricts the candidate set before scoring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    pub resume_id: Option<String>,
}

impl SearchFilter {
    pub fn session(session_id: &str) -> Self {
        Self {
            resume_id: Some(session_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub strategy: &'static str,
    /// Sessions with at least one indexed chunk.
    pub total_documents: usize,
    pub total_chunks: usize,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    fn strategy(&self) -> &'static str;

    /// Indexes `chunks` for `session_id`, replacing whatever that session had before.
    async fn add_documents(&self, session_id: &str, chunks: &[TextChunk]) -> Result<(), SearchError>;

    /// Ranked by descending score; equal scores keep insertion order.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<SearchResult>, SearchError>;

    async fn delete_by_session(&self, session_id: &str);

    async fn stats(&self) -> IndexStats;
}

/// Stable descending sort, then truncation to `top_k`.
fn rank(mut results: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::chunker::ChunkMetadata;

    fn result(text: &str, score: f64) -> SearchResult {
        SearchResult {
            text: text.to_string(),
            score,
            metadata: EntryMetadata {
                chunk_type: ChunkType::Content,
                chunk_index: 0,
                source: "resume".to_string(),
                resume_id: "s1".to_string(),
            },
        }
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let ranked = rank(
            vec![result("a", 1.0), result("b", 2.0), result("c", 1.0), result("d", 1.0)],
            3,
        );
        let order: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_indexed_chunk_takes_session_id() {
        let chunk = TextChunk {
            text: "Rust".to_string(),
            index: 3,
            metadata: ChunkMetadata {
                source: "resume".to_string(),
                chunk_type: ChunkType::Section,
                start_char: 0,
                end_char: 4,
            },
        };
        let indexed = IndexedChunk::new(&chunk, "session-1");
        assert_eq!(indexed.metadata.resume_id, "session-1");
        assert_eq!(indexed.metadata.chunk_index, 3);
        assert_eq!(indexed.metadata.chunk_type, ChunkType::Section);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let json = serde_json::to_value(result("a", 1.0)).unwrap();
        assert_eq!(json["metadata"]["chunkType"], "content");
        assert_eq!(json["metadata"]["resumeId"], "s1");
    }
}
