//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::scraping::http::DEFAULT_USER_AGENT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Upper bound of the random delay before each page request, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Result pages fetched per search
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Pages fetched concurrently per site
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Sites to search
    #[serde(default = "default_sites")]
    pub sites: Vec<String>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_pages() -> u32 {
    3
}

fn default_concurrency() -> usize {
    2
}

fn default_sites() -> Vec<String> {
    vec!["amazon".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            proxy: None,
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            pages: default_pages(),
            concurrency: default_concurrency(),
            format: OutputFormat::Table,
            sites: default_sites(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("shop-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("SHOP_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Some(delay) = env_parse("SHOP_DELAY") {
            self.delay_ms = delay;
        }

        if let Some(timeout) = env_parse("SHOP_TIMEOUT") {
            self.timeout_secs = timeout;
        }

        if let Some(pages) = env_parse("SHOP_PAGES") {
            self.pages = pages;
        }

        if let Some(concurrency) = env_parse("SHOP_CONCURRENCY") {
            self.concurrency = concurrency;
        }

        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
