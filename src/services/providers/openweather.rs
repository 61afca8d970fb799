//! OpenWeatherMap current weather provider
//!
//! API Flow:
//! 1. Current weather: GET {api_url}?q={city}&appid={key}&units=metric
//! 2. The first entry of the `weather` array carries the main condition
//!
//! A single attempt per lookup, bounded by the client timeout.
use crate::{
    error::{AppError, AppResult},
    models::OpenWeatherResponse,
    services::providers::WeatherProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl OpenWeatherProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(api_key: Option<String>, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    /// Pulls the main condition out of a response body
    fn parse_condition(body: &str) -> AppResult<String> {
        let response: OpenWeatherResponse = serde_json::from_str(body).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse weather response: {}", e))
        })?;

        response
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.main)
            .ok_or_else(|| AppError::ExternalApi("Weather response has no conditions".to_string()))
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_condition(&self, city: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalApi("No weather API key configured".to_string()))?;

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Weather API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        tracing::debug!(response = %body, "Raw weather API response");

        let condition = Self::parse_condition(&body)?;

        tracing::info!(
            city = %city,
            condition = %condition,
            provider = "openweathermap",
            "Weather fetched"
        );

        Ok(condition)
    }

    fn name(&self) -> &'static str {
        "openweathermap"
    }
}
