use crate::error::ConfigError;
use crate::filter::LinkFilterConfig;
use crate::traversal::{ContentMode, DEFAULT_MAX_STEPS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a careers page search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Whether pages are judged by their links or their text
    #[serde(default)]
    pub mode: ContentMode,

    /// Maximum number of fetch/decide cycles per run
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Keyword vocabulary and similarity threshold for link filtering
    #[serde(flatten)]
    pub filter: LinkFilterConfig,

    /// Stop when the oracle leads back to any page already visited in the run
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Per-page load timeout
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Wall-clock limit for a whole run, checked between steps (null for none)
    #[serde(default = "default_total_timeout_secs")]
    pub total_timeout_secs: Option<u64>,

    /// Language model settings
    #[serde(default)]
    pub oracle: OracleConfig,
}

/// Settings for the OpenAI-compatible decision oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// API root, without the `/chat/completions` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_detect_cycles() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_page_timeout_secs() -> u64 {
    45
}

fn default_total_timeout_secs() -> Option<u64> {
    Some(600)
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            mode: ContentMode::default(),
            max_steps: default_max_steps(),
            filter: LinkFilterConfig::default(),
            detect_cycles: default_detect_cycles(),
            webdriver_url: default_webdriver_url(),
            page_timeout_secs: default_page_timeout_secs(),
            total_timeout_secs: default_total_timeout_secs(),
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FinderConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lets `WEBDRIVER_URL` override the configured WebDriver server
    pub fn apply_env_overrides(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }
}
