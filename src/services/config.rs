use crate::domain::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS};
use serde::Deserialize;
use std::path::PathBuf;

pub const API_ENV: &str = "SHOPFRONT_API";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_log")]
    pub log: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_log() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_ms: default_timeout_ms(),
            log: default_log(),
        }
    }
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/shopfront/config.toml"))
}

/// Reads `config.toml`, then applies `SHOPFRONT_API` and the `--api` flag,
/// in that order of precedence (flag wins).
pub fn load_config(api_override: Option<&str>) -> anyhow::Result<Config> {
    let path = config_path()?;
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw)?
    } else {
        Config::default()
    };

    if let Ok(env_api) = std::env::var(API_ENV) {
        if !env_api.trim().is_empty() {
            config.api_url = env_api;
        }
    }
    if let Some(api) = api_override {
        config.api_url = api.to_string();
    }
    if config.timeout_ms == 0 {
        anyhow::bail!("timeout_ms must be greater than zero");
    }
    Ok(config)
}
