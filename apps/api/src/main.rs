mod analysis;
mod chat;
mod config;
mod documents;
mod errors;
mod llm_client;
mod routes;
mod search;
mod sessions;
mod state;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{Analyzer, LlmAnalyzer, RuleBasedAnalyzer};
use crate::chat::{LlmResponder, Responder, TemplateResponder};
use crate::config::{AiProvider, Config, SearchStrategy};
use crate::documents::chunker::TextChunker;
use crate::llm_client::{CompletionProvider, EmbeddingProvider, GeminiClient, OpenAiClient};
use crate::routes::build_router;
use crate::search::{KeywordIndex, SearchIndex, VectorIndex};
use crate::state::AppState;

/// One hosted client seen through both provider traits.
struct Providers {
    completion: Arc<dyn CompletionProvider>,
    embedding: Arc<dyn EmbeddingProvider>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on an unusable provider/strategy combination)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume screener v{}", env!("CARGO_PKG_VERSION"));

    let providers = build_providers(&config)?;

    let index: Arc<dyn SearchIndex> = match (config.search_strategy, &providers) {
        (SearchStrategy::Embedding, Some(p)) => Arc::new(VectorIndex::new(p.embedding.clone())),
        (SearchStrategy::Embedding, None) => {
            anyhow::bail!("SEARCH_STRATEGY=embedding needs a hosted AI provider")
        }
        (SearchStrategy::Keyword, _) => Arc::new(KeywordIndex::new()),
    };

    let (analyzer, responder): (Arc<dyn Analyzer>, Arc<dyn Responder>) = match &providers {
        Some(p) => (
            Arc::new(LlmAnalyzer::new(p.completion.clone())),
            Arc::new(LlmResponder::new(p.completion.clone())),
        ),
        None => (Arc::new(RuleBasedAnalyzer::new()), Arc::new(TemplateResponder)),
    };
    info!(
        "Search: {} | analysis: {} | chat: {}",
        index.strategy(),
        analyzer.backend(),
        responder.backend()
    );

    let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .context("FRONTEND_URL is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let port = config.port;
    let state = AppState::new(config, chunker, index, analyzer, responder);

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the hosted client named by AI_PROVIDER; `None` for local mode.
fn build_providers(config: &Config) -> Result<Option<Providers>> {
    match config.ai_provider {
        AiProvider::Local => Ok(None),
        AiProvider::OpenAi => {
            let key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY is not set")?;
            let client = Arc::new(OpenAiClient::new(key)?);
            info!("OpenAI client initialized");
            Ok(Some(Providers {
                completion: client.clone(),
                embedding: client,
            }))
        }
        AiProvider::Gemini => {
            let key = config
                .gemini_api_key
                .clone()
                .context("GEMINI_API_KEY is not set")?;
            let client = Arc::new(GeminiClient::new(key)?);
            info!("Gemini client initialized");
            Ok(Some(Providers {
                completion: client.clone(),
                embedding: client,
            }))
        }
    }
}
