use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::model::reporter::DEFAULT_MAX_TOKENS;

pub const DEFAULT_PREDICT_URL: &str = "http://localhost:8000/predict";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Process-wide settings, read once at startup and handed to the clients.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub predict_url: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: String,
    pub report_max_tokens: u32,
    pub host: String,
    pub port: u16,
    pub template_glob: String,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let llm_api_key = lookup("LLM_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("LLM_API_KEY must be set to call the language model"))?;

        Ok(Self {
            predict_url: or_default("PREDICT_URL", DEFAULT_PREDICT_URL),
            llm_base_url: or_default("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: or_default("LLM_MODEL", DEFAULT_LLM_MODEL),
            llm_api_key,
            report_max_tokens: parse_or(&lookup, "REPORT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            host: or_default("HOST", "127.0.0.1"),
            port: parse_or(&lookup, "PORT", 8080)?,
            template_glob: or_default("TEMPLATE_GLOB", "templates/**/*"),
            static_dir: or_default("STATIC_DIR", "./static"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}
