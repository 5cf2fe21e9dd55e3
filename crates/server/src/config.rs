//! Startup configuration, read once from the environment (and `.env`)

use anyhow::{bail, Context};
use engine::OpenAiConfig;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "data/trades.db";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Remote store; `None` means the local SQLite journal at `db_path`
    pub supabase: Option<SupabaseConfig>,
    pub db_path: String,
    /// Cap on rows fetched per request (most recent first)
    pub fetch_limit: Option<u32>,
    /// Completion API; `None` falls back to the template coach
    pub completion: Option<OpenAiConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(SupabaseConfig { url, service_key }),
            (None, None) => None,
            (Some(_), None) => bail!("SUPABASE_URL is set but SUPABASE_SERVICE_KEY is missing"),
            (None, Some(_)) => bail!("SUPABASE_SERVICE_KEY is set but SUPABASE_URL is missing"),
        };

        let db_path = get("TRADE_ANALYSIS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let fetch_limit = get("TRADE_FETCH_LIMIT")
            .map(|v| v.parse::<u32>().context("TRADE_FETCH_LIMIT must be a positive integer"))
            .transpose()?;
        if fetch_limit == Some(0) {
            bail!("TRADE_FETCH_LIMIT must be greater than zero");
        }

        let completion = match get("OPENAI_API_KEY") {
            Some(key) => {
                let mut cfg = OpenAiConfig::new(key);
                if let Some(base_url) = get("OPENAI_BASE_URL") {
                    cfg.base_url = base_url;
                }
                if let Some(model) = get("OPENAI_MODEL") {
                    cfg.model = model;
                }
                if let Some(max_tokens) = get("OPENAI_MAX_TOKENS") {
                    cfg.max_tokens = max_tokens
                        .parse()
                        .context("OPENAI_MAX_TOKENS must be an integer")?;
                }
                if let Some(secs) = get("COMPLETION_TIMEOUT_SECS") {
                    let secs: u64 = secs
                        .parse()
                        .context("COMPLETION_TIMEOUT_SECS must be an integer")?;
                    cfg.timeout = Duration::from_secs(secs);
                }
                Some(cfg)
            }
            None => None,
        };

        Ok(Self {
            supabase,
            db_path,
            fetch_limit,
            completion,
        })
    }

    pub fn store_label(&self) -> String {
        match &self.supabase {
            Some(s) => format!("Supabase ({})", s.url),
            None => format!("SQLite ({})", self.db_path),
        }
    }
}
