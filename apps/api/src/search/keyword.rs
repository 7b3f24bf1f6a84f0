//! Keyword strategy: term-frequency scoring with an exact-phrase bonus.
//!
//! score = 10·[phrase in doc] + Σ ln(1 + tf) + Σ 0.5·[term substring of doc],
//! normalized by ln(1 + doc token count). Zero scores are not returned.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{rank, IndexStats, IndexedChunk, SearchError, SearchFilter, SearchIndex, SearchResult};
use crate::documents::chunker::TextChunk;

const PHRASE_BONUS: f64 = 10.0;
const SUBSTRING_BONUS: f64 = 0.5;
const MIN_TOKEN_CHARS: usize = 3;

/// Lowercases, replaces non-word characters with spaces, drops tokens of two chars or fewer.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(String::from)
        .collect()
}

/// A chunk with its precomputed term-frequency profile.
#[derive(Debug)]
struct KeywordEntry {
    chunk: IndexedChunk,
    lowered: String,
    term_counts: HashMap<String, usize>,
    token_count: usize,
}

impl KeywordEntry {
    fn new(chunk: IndexedChunk) -> Self {
        let tokens = tokenize(&chunk.text);
        let mut term_counts = HashMap::new();
        for token in &tokens {
            *term_counts.entry(token.clone()).or_insert(0) += 1;
        }
        Self {
            lowered: chunk.text.to_lowercase(),
            token_count: tokens.len(),
            term_counts,
            chunk,
        }
    }

    fn score(&self, query_terms: &[String], phrase: &str) -> f64 {
        if query_terms.is_empty() || self.token_count == 0 {
            return 0.0;
        }

        let mut score = 0.0;
        if self.lowered.contains(phrase) {
            score += PHRASE_BONUS;
        }
        for term in query_terms {
            if let Some(&count) = self.term_counts.get(term) {
                score += (1.0 + count as f64).ln();
            }
            if self.lowered.contains(term.as_str()) {
                score += SUBSTRING_BONUS;
            }
        }
        score / (1.0 + self.token_count as f64).ln()
    }
}

#[derive(Debug)]
struct SessionEntries {
    session_id: String,
    entries: Vec<KeywordEntry>,
}

/// Sessions are kept in first-insertion order so unfiltered ties are deterministic.
#[derive(Debug, Default)]
pub struct KeywordIndex {
    sessions: RwLock<Vec<SessionEntries>>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchIndex for KeywordIndex {
    fn strategy(&self) -> &'static str {
        "keyword"
    }

    async fn add_documents(&self, session_id: &str, chunks: &[TextChunk]) -> Result<(), SearchError> {
        let entries: Vec<KeywordEntry> = chunks
            .iter()
            .map(|c| KeywordEntry::new(IndexedChunk::new(c, session_id)))
            .collect();

        let mut sessions = self.sessions.write().await;
        let existing = sessions.iter().position(|s| s.session_id == session_id);
        match (existing, entries.is_empty()) {
            // A session with no chunks is not kept, matching `stats`.
            (Some(i), true) => {
                sessions.remove(i);
            }
            (Some(i), false) => sessions[i].entries = entries,
            (None, true) => {}
            (None, false) => sessions.push(SessionEntries {
                session_id: session_id.to_string(),
                entries,
            }),
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let query_terms = tokenize(query);
        let phrase = query_terms.join(" ");
        let wanted = filter.and_then(|f| f.resume_id.as_deref());

        let sessions = self.sessions.read().await;
        let results: Vec<SearchResult> = sessions
            .iter()
            .filter(|s| wanted.map_or(true, |id| s.session_id == id))
            .flat_map(|s| s.entries.iter())
            .filter_map(|entry| {
                let score = entry.score(&query_terms, &phrase);
                (score > 0.0).then(|| SearchResult {
                    text: entry.chunk.text.clone(),
                    score,
                    metadata: entry.chunk.metadata.clone(),
                })
            })
            .collect();

        Ok(rank(results, top_k))
    }

    async fn delete_by_session(&self, session_id: &str) {
        self.sessions
            .write()
            .await
            .retain(|s| s.session_id != session_id);
    }

    async fn stats(&self) -> IndexStats {
        let sessions = self.sessions.read().await;
        IndexStats {
            strategy: self.strategy(),
            total_documents: sessions.len(),
            total_chunks: sessions.iter().map(|s| s.entries.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::chunker::TextChunker;

    fn chunks(texts: &[&str]) -> Vec<TextChunk> {
        let chunker = TextChunker::default();
        texts
            .iter()
            .flat_map(|t| chunker.chunk_document(t, "resume"))
            .enumerate()
            .map(|(i, mut c)| {
                c.index = i;
                c
            })
            .collect()
    }

    #[test]
    fn test_tokenize_drops_short_and_punctuation() {
        assert_eq!(
            tokenize("I built Node.js APIs, on AWS!"),
            vec!["built", "node", "apis", "aws"]
        );
    }

    #[test]
    fn test_score_rises_with_term_frequency() {
        let once = KeywordEntry::new(IndexedChunk::new(&chunks(&["rust alpha beta gamma"])[0], "s"));
        let twice = KeywordEntry::new(IndexedChunk::new(&chunks(&["rust rust beta gamma"])[0], "s"));
        let terms = tokenize("rust");
        assert!(twice.score(&terms, "rust") > once.score(&terms, "rust"));
    }

    #[tokio::test]
    async fn test_exact_phrase_beats_scattered_terms() {
        let index = KeywordIndex::new();
        index
            .add_documents(
                "s1",
                &chunks(&[
                    "built systems with rust distributed daily",
                    "built distributed systems with rust daily",
                ]),
            )
            .await
            .unwrap();

        let results = index.search("distributed systems", 5, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "built distributed systems with rust daily");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_zero_scores_are_excluded() {
        let index = KeywordIndex::new();
        index
            .add_documents("s1", &chunks(&["Python and Django", "React and Redux"]))
            .await
            .unwrap();

        let results = index.search("react", 5, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].text.contains("React"));
    }

    #[tokio::test]
    async fn test_query_without_usable_terms_returns_nothing() {
        let index = KeywordIndex::new();
        index.add_documents("s1", &chunks(&["Go is ok"])).await.unwrap();
        assert!(index.search("is it ok", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_restricts_to_session() {
        let index = KeywordIndex::new();
        index.add_documents("s1", &chunks(&["Rust engineer"])).await.unwrap();
        index.add_documents("s2", &chunks(&["Rust developer"])).await.unwrap();

        let results = index
            .search("rust", 5, Some(&SearchFilter::session("s2")))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.resume_id, "s2");

        let unknown = index
            .search("rust", 5, Some(&SearchFilter::session("nope")))
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_search_is_empty() {
        let index = KeywordIndex::new();
        index.add_documents("s1", &chunks(&["Rust engineer"])).await.unwrap();
        index.delete_by_session("s1").await;

        let results = index
            .search("rust", 5, Some(&SearchFilter::session("s1")))
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(index.stats().await.total_chunks, 0);
    }

    #[tokio::test]
    async fn test_re_adding_replaces_session_entries() {
        let index = KeywordIndex::new();
        index
            .add_documents("s1", &chunks(&["Rust engineer", "Go engineer"]))
            .await
            .unwrap();
        index.add_documents("s1", &chunks(&["Rust engineer"])).await.unwrap();
        index.add_documents("s2", &chunks(&["Java engineer"])).await.unwrap();

        let stats = index.stats().await;
        assert_eq!(stats.strategy, "keyword");
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_chunks, 2);
    }

    #[tokio::test]
    async fn test_empty_chunk_list_is_not_a_document() {
        let index = KeywordIndex::new();
        index.add_documents("s1", &[]).await.unwrap();
        assert_eq!(index.stats().await.total_documents, 0);

        index.add_documents("s2", &chunks(&["Rust engineer"])).await.unwrap();
        index.add_documents("s2", &[]).await.unwrap();
        let stats = index.stats().await;
        assert_eq!((stats.total_documents, stats.total_chunks), (0, 0));
        assert!(index.search("rust", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_k_truncates() {
        let index = KeywordIndex::new();
        index
            .add_documents("s1", &chunks(&["rust one", "rust two", "rust three"]))
            .await
            .unwrap();
        assert_eq!(index.search("rust", 2, None).await.unwrap().len(), 2);
    }
}
