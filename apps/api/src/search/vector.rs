//! Embedding strategy: cosine similarity against provider vectors.
//!
//! Chunks are embedded in one batch call per `add_documents`; each search embeds
//! the query once. Provider failures come back as `SearchError::Embedding`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{rank, IndexStats, IndexedChunk, SearchError, SearchFilter, SearchIndex, SearchResult};
use crate::documents::chunker::TextChunk;
use crate::llm_client::EmbeddingProvider;

/// `dot(a,b) / (|a|·|b|)`; 0 when either norm is 0 or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[derive(Debug)]
struct VectorEntry {
    chunk: IndexedChunk,
    vector: Vec<f32>,
}

pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<VectorEntry>>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), SearchError> {
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(SearchError::Dimension {
                expected,
                got: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for VectorIndex {
    fn strategy(&self) -> &'static str {
        "embedding"
    }

    async fn add_documents(&self, session_id: &str, chunks: &[TextChunk]) -> Result<(), SearchError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| SearchError::Embedding(e.to_string()))?;
        if vectors.len() != chunks.len() {
            return Err(SearchError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }
        for vector in &vectors {
            self.check_dimension(vector)?;
        }

        let new_entries = chunks.iter().zip(vectors).map(|(chunk, vector)| VectorEntry {
            chunk: IndexedChunk::new(chunk, session_id),
            vector,
        });

        let mut entries = self.entries.write().await;
        entries.retain(|e| e.chunk.metadata.resume_id != session_id);
        entries.extend(new_entries);
        info!(
            "Indexed {} embedded chunks for session {session_id} (model: {})",
            chunks.len(),
            self.embedder.model()
        );
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let wanted = filter.and_then(|f| f.resume_id.as_deref());
        let matches_filter =
            |entry: &VectorEntry| wanted.map_or(true, |id| entry.chunk.metadata.resume_id == id);

        // Skip the provider call when nothing could match
        if !self.entries.read().await.iter().any(|e| matches_filter(e)) {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| SearchError::Embedding(e.to_string()))?;
        self.check_dimension(&query_vector)?;

        let entries = self.entries.read().await;
        let results: Vec<SearchResult> = entries
            .iter()
            .filter(|e| matches_filter(*e))
            .map(|entry| SearchResult {
                text: entry.chunk.text.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
                metadata: entry.chunk.metadata.clone(),
            })
            .collect();

        Ok(rank(results, top_k))
    }

    async fn delete_by_session(&self, session_id: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.chunk.metadata.resume_id != session_id);
        if entries.len() != before {
            info!(
                "Removed {} embedded chunks for session {session_id}",
                before - entries.len()
            );
        }
    }

    async fn stats(&self) -> IndexStats {
        let entries = self.entries.read().await;
        let sessions: HashSet<&str> = entries
            .iter()
            .map(|e| e.chunk.metadata.resume_id.as_str())
            .collect();
        IndexStats {
            strategy: self.strategy(),
            total_documents: sessions.len(),
            total_chunks: entries.len(),
        }
    }
}
