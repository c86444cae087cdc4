use crate::analyzer::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL, PLACEHOLDER_API_KEY};
use crate::error::{AdvisorError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub http_timeout_secs: u64,
    pub structured_output: bool, // ask for JSON, fall back to text heuristics
    pub production: bool,
}

impl Config {
    /// Load config from a specific .env file, or the default `.env` if None.
    pub fn from_env_file(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => { dotenvy::from_filename(p).ok(); }
            None => { dotenvy::dotenv().ok(); }
        }
        Self::build_from_env()
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::build_from_env()
    }

    fn build_from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing keys take their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            gemini_api_key: env("GEMINI_API_KEY", PLACEHOLDER_API_KEY),
            gemini_model: env("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_api_base: env("GEMINI_API_BASE", DEFAULT_API_BASE),
            http_timeout_secs: parse_u64("HTTP_TIMEOUT_SECS", &env("HTTP_TIMEOUT_SECS", "60"))?,
            structured_output: parse_bool("STRUCTURED_OUTPUT", &env("STRUCTURED_OUTPUT", "true"))?,
            production: parse_bool("PRODUCTION", &env("PRODUCTION", "false"))?,
        })
    }

    /// Defaults everywhere except the key.
    pub fn with_api_key(api_key: &str) -> Self {
        Self {
            gemini_api_key: api_key.to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            http_timeout_secs: 60,
            structured_output: true,
            production: false,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_u64(key: &str, val: &str) -> Result<u64> {
    val.trim()
        .parse()
        .map_err(|_| AdvisorError::Configuration(format!("Invalid number for {key}: {val}")))
}

fn parse_bool(key: &str, val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(AdvisorError::Configuration(format!("Invalid boolean for {key}: {val}"))),
    }
}
