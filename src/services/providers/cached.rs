use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::{error::AppResult, services::providers::WeatherProvider};

/// A condition string and when it was fetched
#[derive(Debug, Clone)]
struct CachedCondition {
    condition: String,
    cached_at: DateTime<Utc>,
}

/// Keeps successful lookups per city for a fixed TTL
///
/// Failures are never cached, so the next request retries the provider.
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedCondition>>,
}

impl CachedWeatherProvider {
    pub fn new(inner: Arc<dyn WeatherProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(city: &str) -> String {
        city.trim().to_lowercase()
    }

    async fn get_fresh(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Utc::now() - entry.cached_at < self.ttl)
            .map(|entry| entry.condition.clone())
    }
}

#[async_trait::async_trait]
impl WeatherProvider for CachedWeatherProvider {
    async fn current_condition(&self, city: &str) -> AppResult<String> {
        let key = Self::cache_key(city);

        if let Some(condition) = self.get_fresh(&key).await {
            tracing::debug!(city = %city, "Weather cache hit");
            return Ok(condition);
        }

        tracing::debug!(city = %city, "Weather cache miss");

        let condition = self.inner.current_condition(city).await?;

        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CachedCondition {
                condition: condition.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(condition)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
