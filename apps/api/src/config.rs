use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

/// Which backend answers analysis and chat requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Local,
    OpenAi,
    Gemini,
}

impl FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "rules" => Ok(AiProvider::Local),
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(anyhow!(
                "AI_PROVIDER must be one of local, openai, gemini (got '{other}')"
            )),
        }
    }
}

/// Which retrieval index backs chat and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Keyword,
    Embedding,
}

impl FromStr for SearchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(SearchStrategy::Keyword),
            "embedding" | "vector" => Ok(SearchStrategy::Embedding),
            other => Err(anyhow!(
                "SEARCH_STRATEGY must be keyword or embedding (got '{other}')"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a selected provider has no API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub frontend_url: String,
    pub upload_dir: PathBuf,
    pub max_file_size: usize,
    pub ai_provider: AiProvider,
    pub search_strategy: SearchStrategy,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            port: parse_var(&lookup, "PORT", 3001)?,
            rust_log: get("RUST_LOG", "info"),
            frontend_url: get("FRONTEND_URL", "http://localhost:5173"),
            upload_dir: PathBuf::from(get("UPLOAD_DIR", "./uploads")),
            max_file_size: parse_var(&lookup, "MAX_FILE_SIZE", 10 * 1024 * 1024)?,
            ai_provider: get("AI_PROVIDER", "local").parse()?,
            search_strategy: get("SEARCH_STRATEGY", "keyword").parse()?,
            openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            chunk_size: parse_var(&lookup, "CHUNK_SIZE", 800)?,
            chunk_overlap: parse_var(&lookup, "CHUNK_OVERLAP", 200)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.ai_provider {
            AiProvider::OpenAi if self.openai_api_key.is_none() => {
                bail!("Required environment variable 'OPENAI_API_KEY' is not set")
            }
            AiProvider::Gemini if self.gemini_api_key.is_none() => {
                bail!("Required environment variable 'GEMINI_API_KEY' is not set")
            }
            AiProvider::Local if self.search_strategy == SearchStrategy::Embedding => {
                bail!("SEARCH_STRATEGY=embedding needs AI_PROVIDER=openai or gemini")
            }
            _ => {}
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number (got '{raw}')")),
        None => Ok(default),
    }
}
