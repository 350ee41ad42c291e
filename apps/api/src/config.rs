use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Which backend scores tailored resumes (orchestrator step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtsScorerKind {
    Llm,
    Heuristic,
}

impl FromStr for AtsScorerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "llm" => Ok(AtsScorerKind::Llm),
            "heuristic" => Ok(AtsScorerKind::Heuristic),
            other => Err(anyhow!("ATS_SCORER must be 'llm' or 'heuristic', got '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    /// Unset: applications live in process memory.
    pub database_url: Option<String>,
    /// Unset: extension slots live in process memory.
    pub redis_url: Option<String>,
    pub ats_scorer: AtsScorerKind,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            ats_scorer: optional_env("ATS_SCORER")
                .as_deref()
                .unwrap_or("llm")
                .parse()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
