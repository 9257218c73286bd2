//! Server configuration from environment variables.

use claude::Claude;
use reader_core::GeneratorConfig;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3015;
const DEFAULT_DATABASE_URL: &str = "sqlite://database.sqlite";
const DEFAULT_WORD_MAPPINGS_PATH: &str = "word_mappings.json";

/// Errors from reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Invalid PORT {0:?}")]
    InvalidPort(String),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    /// Provider host override (`ANTHROPIC_BASE_URL`).
    pub base_url: Option<String>,
    /// Model override (`STORY_MODEL`).
    pub model: Option<String>,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub word_mappings_path: PathBuf,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get("ANTHROPIC_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            base_url: get("ANTHROPIC_BASE_URL"),
            model: get("STORY_MODEL"),
            host: get("READER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            word_mappings_path: get("WORD_MAPPINGS_PATH")
                .unwrap_or_else(|| DEFAULT_WORD_MAPPINGS_PATH.to_string())
                .into(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the model client.
    pub fn provider(&self) -> Claude {
        let client = Claude::new(&self.api_key);
        match &self.base_url {
            Some(base_url) => client.with_base_url(base_url),
            None => client,
        }
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            model: self.model.clone(),
            ..GeneratorConfig::default()
        }
    }
}
