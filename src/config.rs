use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the upstream API. `None` is not fatal: POST
    /// requests answer 500 until it is set.
    pub api_key: Option<String>,
    pub api_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());

        let api_url = lookup("OPENAI_API_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => 8080,
        };

        Ok(Self {
            api_key,
            api_url,
            host,
            port,
        })
    }
}
