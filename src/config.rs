use serde::Deserialize;

use crate::pipeline::rate_limit::RateLimitConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Chat completions API key (OpenAI-compatible endpoint)
    pub llm_api_key: String,

    /// Chat completions base URL
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Region code for streaming availability lookups
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Requests allowed per session within one rate window
    #[serde(default = "default_rate_max_requests")]
    pub rate_max_requests: u32,

    /// Length of the sliding rate window, in seconds
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: i64,

    /// Penalty block after exceeding the window, in seconds
    #[serde(default = "default_rate_block_secs")]
    pub rate_block_secs: i64,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_watch_region() -> String {
    "US".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_rate_max_requests() -> u32 {
    5
}

fn default_rate_window_secs() -> i64 {
    60
}

fn default_rate_block_secs() -> i64 {
    300
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Rate-limiter tunables as the pipeline consumes them.
    pub fn rate_limits(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_max_requests,
            window_secs: self.rate_window_secs,
            block_secs: self.rate_block_secs,
        }
    }
}
