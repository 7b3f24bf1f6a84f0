use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::chat::{ConversationManager, Responder};
use crate::config::Config;
use crate::documents::chunker::TextChunker;
use crate::search::SearchIndex;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    /// Keyword or embedding index, fixed by SEARCH_STRATEGY at startup.
    pub index: Arc<dyn SearchIndex>,
    /// Rule-based or LLM analyzer, fixed by AI_PROVIDER at startup.
    pub analyzer: Arc<dyn Analyzer>,
    pub conversations: Arc<ConversationManager>,
    pub chunker: TextChunker,
}

impl AppState {
    /// Wires the owned stores around the chosen strategies.
    pub fn new(
        config: Config,
        chunker: TextChunker,
        index: Arc<dyn SearchIndex>,
        analyzer: Arc<dyn Analyzer>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        let conversations = Arc::new(ConversationManager::new(index.clone(), responder));
        Self {
            config,
            sessions: Arc::new(SessionStore::new()),
            index,
            analyzer,
            conversations,
            chunker,
        }
    }
}
