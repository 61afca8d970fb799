//! Weather data provider abstraction
//!
//! The recommendation engine only needs the provider's main condition string
//! for a city. Providers report every failure as an error; turning failures
//! into the sunny default is the caller's job.
use crate::error::AppResult;

pub mod cached;
pub mod openweather;

pub use cached::CachedWeatherProvider;
pub use openweather::OpenWeatherProvider;

/// Trait for weather data providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the main weather condition for a city (e.g. "Clouds", "Rain")
    async fn current_condition(&self, city: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
