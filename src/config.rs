use std::fmt;
use std::path::PathBuf;
use teloxide::types::ChatId;

use crate::assistant::openrouter::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    Missing(&'static str),
    /// A variable holds something that is not a number.
    InvalidNumber { var: &'static str, value: String },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "environment variable {} is required", var),
            Self::InvalidNumber { var, value } => {
                write!(f, "environment variable {} must be a number, got '{}'", var, value)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub telegram_token: String,
    /// Bearer token for the completion endpoint.
    pub ai_api_key: String,
    pub ai_api_url: String,
    pub ai_model: String,
    /// SQLite file with registrations and the interaction log.
    pub database_path: PathBuf,
    /// Directory for state files (logs). Defaults to current directory.
    pub data_dir: PathBuf,
    /// Chat that receives a mirror of the bot's logs.
    pub log_chat_id: Option<ChatId>,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token = get("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "TELEGRAM_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let ai_api_key = get("OPENROUTER_API_KEY").ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?;

        let ai_api_url = get("AI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !ai_api_url.starts_with("http://") && !ai_api_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "AI_API_URL must be an http(s) URL, got '{}'",
                ai_api_url
            )));
        }

        let data_dir = get("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("assistente_ads.db"));

        let log_chat_id = match get("LOG_CHAT_ID") {
            Some(raw) => Some(ChatId(raw.parse::<i64>().map_err(|_| ConfigError::InvalidNumber {
                var: "LOG_CHAT_ID",
                value: raw.clone(),
            })?)),
            None => None,
        };

        Ok(Self {
            telegram_token,
            ai_api_key,
            ai_api_url,
            ai_model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            database_path,
            data_dir,
            log_chat_id,
        })
    }
}
