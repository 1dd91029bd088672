//! Client configuration.
//!
//! Sources, highest priority first:
//! 1. `TASKIA_*` environment variables (`TASKIA_API_URL`, `TASKIA_TIMEOUT_SECS`)
//! 2. `taskia.toml` in the working directory
//! 3. built-in defaults

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";
const CONFIG_FILE: &str = "taskia.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    /// Request timeout. Unset means the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment().extract()?;
        cfg.validated()
    }

    /// Like [`ClientConfig::load`], reading `.env` from the working directory first.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if Path::new(CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(CONFIG_FILE));
        }
        figment.merge(Env::prefixed("TASKIA_"))
    }

    /// Same config pointed at another base URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = api_url.to_string();
        self.validated()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.api_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_url".to_string(),
                reason: format!("expected an http(s) url, got {}", trimmed),
            });
        }
        if self.timeout_secs == Some(0) {
            self.timeout_secs = None;
        }
        self.api_url = trimmed.to_string();
        Ok(self)
    }
}
