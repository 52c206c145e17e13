use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::models::Keyword;
use crate::scheduler::ScheduleConfig;

pub const DEFAULT_KEYWORDS: [&str; 3] = [
    "best coffee maker for home",
    "how to start a vegetable garden",
    "beginners guide to python programming",
];

const DEFAULT_INTERVAL_SECS: u64 = 24 * 60 * 60;
const MAX_COMPETITOR_PAGES: usize = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub serpapi_api_key: String,
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub search_country: String,
    pub search_language: String,
    pub competitor_pages: usize,
    pub scheduler_enabled: bool,
    pub schedule: ScheduleConfig,
    pub rust_log: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let serpapi_api_key = required("SERPAPI_API_KEY")?;
        let llm_api_key = required("OPENAI_API_KEY")?;

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = get("PORT").unwrap_or_else(|| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| invalid("PORT", e))?;
        let ip = IpAddr::from_str(&host).map_err(|e| invalid("HOST", e))?;

        let competitor_pages = match get("COMPETITOR_PAGES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| invalid("COMPETITOR_PAGES", e))?,
            None => 3,
        };
        if competitor_pages == 0 || competitor_pages > MAX_COMPETITOR_PAGES {
            return Err(ConfigError::Invalid {
                key: "COMPETITOR_PAGES",
                message: format!("must be between 1 and {MAX_COMPETITOR_PAGES}"),
            });
        }

        let scheduler_enabled = match get("SCHEDULER_ENABLED") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "SCHEDULER_ENABLED",
                message: format!("expected true/false, got '{raw}'"),
            })?,
            None => true,
        };

        let interval_secs = match get("SCHEDULE_INTERVAL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| invalid("SCHEDULE_INTERVAL_SECS", e))?,
            None => DEFAULT_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SCHEDULE_INTERVAL_SECS",
                message: "must be greater than zero".to_string(),
            });
        }

        let keywords = match get("KEYWORDS") {
            Some(raw) => parse_keywords(&raw),
            None => parse_keywords(&DEFAULT_KEYWORDS.join(";")),
        };
        if keywords.is_empty() {
            return Err(ConfigError::Invalid {
                key: "KEYWORDS",
                message: "at least one keyword is required".to_string(),
            });
        }

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            serpapi_api_key,
            llm_api_key,
            llm_api_url: get("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            search_country: get("SEARCH_COUNTRY").unwrap_or_else(|| "us".to_string()),
            search_language: get("SEARCH_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            competitor_pages,
            scheduler_enabled,
            schedule: ScheduleConfig {
                keywords,
                interval: Duration::from_secs(interval_secs),
            },
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn invalid(key: &'static str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: err.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `;`-separated list. Blank entries are dropped.
fn parse_keywords(raw: &str) -> Vec<Keyword> {
    raw.split(';').filter_map(|k| Keyword::new(k).ok()).collect()
}
