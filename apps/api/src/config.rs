use anyhow::{Context, Result};
use chrono::Datelike;

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIM: usize = 384;
const DEFAULT_MAX_TEXT_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Everything is optional; missing services fall back to in-process versions.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset: evaluations are kept in memory.
    pub database_url: Option<String>,
    /// Unset: embeddings come from the local hashing embedder.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub reference_year: i32,
    pub max_text_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dim: parse_env("EMBEDDING_DIM", DEFAULT_EMBEDDING_DIM)?,
            reference_year: parse_env("REFERENCE_YEAR", chrono::Utc::now().year())?,
            max_text_bytes: parse_env("MAX_TEXT_BYTES", DEFAULT_MAX_TEXT_BYTES)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            embedding_api_url: None,
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            reference_year: chrono::Utc::now().year(),
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Unset and blank values both count as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
