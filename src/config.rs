use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// OpenWeatherMap API key; without one every lookup falls back to sunny
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// OpenWeatherMap current weather endpoint
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    /// City whose weather drives recommendations
    #[serde(default = "default_weather_city")]
    pub weather_city: String,

    /// Weather lookup timeout in seconds
    #[serde(default = "default_weather_timeout_secs")]
    pub weather_timeout_secs: u64,

    /// How long a successful weather lookup is reused; 0 disables caching
    #[serde(default)]
    pub weather_cache_ttl_secs: u64,

    /// Trained model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Catalog JSON file; the embedded catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Fixed seed for the random fallbacks
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_weather_api_url() -> String {
    "http://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_weather_city() -> String {
    "Mexico City".to_string()
}

fn default_weather_timeout_secs() -> u64 {
    5
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/model.json")
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
