use std::sync::Arc;

use antojo_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        providers::{CachedWeatherProvider, OpenWeatherProvider, WeatherProvider},
        ForestModel, PredictionModel, ProductCatalog, RecommendationEngine,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("antojo_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Catalog and model are loaded once; the service refuses to start without them
    let catalog = Arc::new(ProductCatalog::load_or_embedded(config.catalog_path.as_deref())?);
    let model = ForestModel::load(&config.model_path).inspect_err(|e| {
        tracing::error!(
            path = %config.model_path.display(),
            error = %e,
            hint = e.hint().unwrap_or("check the model artifact"),
            "Failed to load prediction model"
        );
    })?;
    let model: Arc<dyn PredictionModel> = Arc::new(model);

    let mut weather_provider: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherProvider::new(
        config.weather_api_key.clone(),
        config.weather_api_url.clone(),
        config.weather_timeout(),
    )?);
    if config.weather_cache_ttl_secs > 0 {
        weather_provider = Arc::new(CachedWeatherProvider::new(
            weather_provider,
            chrono::Duration::seconds(i64::try_from(config.weather_cache_ttl_secs)?),
        ));
    }
    if config.weather_api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY not set, weather will always be sunny");
    }

    let engine = RecommendationEngine::new(
        catalog,
        model,
        weather_provider,
        config.weather_city.clone(),
        config.rng_seed,
    );

    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
