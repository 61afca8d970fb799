use crate::{models::WeatherCategory, services::providers::WeatherProvider};

const CLOUDY_TERMS: &[&str] = &["cloud", "mist", "fog", "haze"];
const RAINY_TERMS: &[&str] = &["rain", "drizzle", "thunderstorm", "shower"];

/// Maps a provider's main condition string to a weather category
///
/// Matching is case-insensitive substring search, cloudy terms first, then
/// rainy, then clear. Anything unrecognized, including no description, is sunny.
pub fn classify(raw_description: Option<&str>) -> WeatherCategory {
    let description = match raw_description {
        Some(d) => d.to_lowercase(),
        None => return WeatherCategory::Sunny,
    };
    let matches = |terms: &[&str]| terms.iter().any(|term| description.contains(term));

    if matches(CLOUDY_TERMS) {
        WeatherCategory::Cloudy
    } else if matches(RAINY_TERMS) {
        WeatherCategory::Rainy
    } else {
        // "clear" and anything unrecognized
        WeatherCategory::Sunny
    }
}

/// Looks up and classifies the current weather for a city
///
/// Lookup failures are logged and degrade to sunny; this never fails.
pub async fn resolve_weather(provider: &dyn WeatherProvider, city: &str) -> WeatherCategory {
    match provider.current_condition(city).await {
        Ok(condition) => {
            let category = classify(Some(&condition));
            tracing::debug!(
                city = %city,
                condition = %condition,
                category = %category,
                provider = provider.name(),
                "Weather resolved"
            );
            category
        }
        Err(e) => {
            tracing::warn!(
                city = %city,
                error = %e,
                provider = provider.name(),
                "Weather lookup failed, defaulting to sunny"
            );
            WeatherCategory::Sunny
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, services::providers::MockWeatherProvider};

    #[test]
    fn test_classify_known_conditions() {
        assert_eq!(classify(Some("Clouds")), WeatherCategory::Cloudy);
        assert_eq!(classify(Some("Mist")), WeatherCategory::Cloudy);
        assert_eq!(classify(Some("Fog")), WeatherCategory::Cloudy);
        assert_eq!(classify(Some("Rain")), WeatherCategory::Rainy);
        assert_eq!(classify(Some("Drizzle")), WeatherCategory::Rainy);
        assert_eq!(classify(Some("Thunderstorm")), WeatherCategory::Rainy);
        assert_eq!(classify(Some("Clear")), WeatherCategory::Sunny);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify(Some("CLOUDS")), WeatherCategory::Cloudy);
        assert_eq!(classify(Some("light rain")), WeatherCategory::Rainy);
    }

    #[test]
    fn test_classify_cloudy_wins_over_rainy() {
        assert_eq!(classify(Some("rain clouds")), WeatherCategory::Cloudy);
    }

    #[test]
    fn test_classify_defaults_to_sunny() {
        assert_eq!(classify(None), WeatherCategory::Sunny);
        assert_eq!(classify(Some("")), WeatherCategory::Sunny);
        assert_eq!(classify(Some("unknown condition")), WeatherCategory::Sunny);
        assert_eq!(classify(Some("Snow")), WeatherCategory::Sunny);
    }

    #[tokio::test]
    async fn test_resolve_weather_classifies_condition() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current_condition()
            .times(1)
            .returning(|_| Ok("Rain".to_string()));
        provider.expect_name().return_const("mock");

        let weather = resolve_weather(&provider, "Mexico City").await;
        assert_eq!(weather, WeatherCategory::Rainy);
    }

    #[tokio::test]
    async fn test_resolve_weather_failure_is_sunny() {
        let mut provider = MockWeatherProvider::new();
        provider
            .expect_current_condition()
            .returning(|_| Err(AppError::ExternalApi("status 401".to_string())));
        provider.expect_name().return_const("mock");

        let weather = resolve_weather(&provider, "Mexico City").await;
        assert_eq!(weather, WeatherCategory::Sunny);
    }
}
