use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Coarse weather bucket fed to the model as its fifth feature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
}

impl WeatherCategory {
    /// Value used for the weather indicator columns
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rainy => "rainy",
        }
    }
}

impl Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses both the English labels and the Spanish ones found in historical sales data
impl FromStr for WeatherCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunny" | "soleado" => Ok(WeatherCategory::Sunny),
            "cloudy" | "nublado" => Ok(WeatherCategory::Cloudy),
            "rainy" | "lluvioso" => Ok(WeatherCategory::Rainy),
            other => Err(format!("unknown weather category '{}'", other)),
        }
    }
}

// ============================================================================
// OpenWeatherMap API Types
// ============================================================================

/// Current weather response; only the condition list is consumed
#[derive(Debug, Clone, Deserialize)]
pub struct OpenWeatherResponse {
    pub weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenWeatherCondition {
    pub main: String,
}
