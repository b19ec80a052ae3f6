use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::llm::{ModelId, ProviderConfig};

/// Application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the model service
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL for the API
    pub base_url: Option<String>,

    /// Model selected at startup
    pub model: ModelId,

    /// Request timeout; the HTTP client default applies when unset
    pub timeout_seconds: Option<u64>,
}

impl Config {
    /// Initialize configuration from the config file and the environment
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn load_from_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }

        if let Some(key) = var("DISCOVERY_API_KEY") {
            self.api_key = Some(key);
        }

        if let Some(base_url) = var("DISCOVERY_BASE_URL") {
            self.base_url = Some(base_url);
        }

        if let Some(model) = var("DISCOVERY_MODEL") {
            self.model = model
                .parse()
                .with_context(|| format!("Invalid DISCOVERY_MODEL value '{}'", model))?;
        }

        if let Some(timeout) = var("DISCOVERY_TIMEOUT") {
            let seconds = timeout
                .parse()
                .with_context(|| format!("Invalid DISCOVERY_TIMEOUT value '{}'", timeout))?;
            self.timeout_seconds = Some(seconds);
        }

        Ok(())
    }

    /// First existing config file, in priority order:
    /// 1. ./.discovery.json
    /// 2. ./discovery.json
    /// 3. $CONFIG_DIR/discovery/discovery.json
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.discovery.json"),
            PathBuf::from("./discovery.json"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("discovery").join("discovery.json"));
        }
        paths.into_iter().find(|path| path.exists())
    }

    pub async fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Whether a non-blank API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }

    /// Validate the configuration. A missing key is reported per call, not here.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == Some(0) {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }
        if let Some(base_url) = &self.base_url {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(anyhow!("base_url must start with http:// or https://"));
            }
        }
        Ok(())
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider_type: "openai".to_string(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}
