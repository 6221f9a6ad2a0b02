use std::{env, str::FromStr, time::Duration};

use super::env::{AppConfig, ConfigError, DirectoryConfig, GenerationConfig, LoggingConfig};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    /// Builds the configuration from an arbitrary key lookup. Absent keys fall
    /// back to defaults; only values that are present but unparseable fail.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let generation = GenerationConfig {
            api_key: non_empty("OPENAI_API_KEY"),
            model: non_empty("OPENAI_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or("OPENAI_TEMPERATURE", &non_empty, DEFAULT_TEMPERATURE)?,
            api_url: non_empty("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_millis(parse_or(
                "GENERATION_TIMEOUT_MS",
                &non_empty,
                DEFAULT_TIMEOUT_MS,
            )?),
        };

        let directories = DirectoryConfig {
            logs_dir: non_empty("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
            data_dir: non_empty("DATA_DIR").unwrap_or_else(|| "data".to_string()),
        };

        let logging = LoggingConfig {
            level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            generation,
            directories,
            logging,
        })
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
