use rand::{rngs::StdRng, SeedableRng};
use std::sync::{Arc, Mutex};

use crate::{
    error::{AppError, RecommendationFailure},
    models::{ProductId, QuestionnaireAnswer, Recommendation, RecommendationRequest, WeatherCategory},
    services::{
        catalog::ProductCatalog,
        coherence,
        encoder::encode,
        model::PredictionModel,
        providers::WeatherProvider,
        weather::resolve_weather,
    },
};

/// Turns questionnaire answers into a single product recommendation
///
/// Holds the process-wide catalog and model, both read-only after startup.
/// The random source behind the fallbacks is seeded once; a fixed seed makes
/// every random substitution reproducible.
pub struct RecommendationEngine {
    catalog: Arc<ProductCatalog>,
    model: Arc<dyn PredictionModel>,
    weather_provider: Arc<dyn WeatherProvider>,
    city: String,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    /// `seed = Some(s)` produces deterministic fallbacks; `None` seeds from the OS
    pub fn new(
        catalog: Arc<ProductCatalog>,
        model: Arc<dyn PredictionModel>,
        weather_provider: Arc<dyn WeatherProvider>,
        city: impl Into<String>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Self {
            catalog,
            model,
            weather_provider,
            city: city.into(),
            rng: Mutex::new(rng),
        }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Runs validation, weather lookup, encoding, prediction, coherence
    /// correction and the final catalog lookup for one request
    pub async fn recommend(
        &self,
        request: RecommendationRequest,
    ) -> Result<Recommendation, RecommendationFailure> {
        // 1. Validate
        let answer = request
            .validate()
            .map_err(|e| RecommendationFailure::new(e, WeatherCategory::default()))?;

        // 2. Resolve weather (never fails)
        let weather = resolve_weather(self.weather_provider.as_ref(), &self.city).await;

        // 3-5. Encode, predict, correct
        let product_id = self
            .choose_product(&answer, weather)
            .map_err(|e| RecommendationFailure::new(e, weather))?;

        // 6. Resolve against the catalog
        let product = self.catalog.get(&product_id).cloned().ok_or_else(|| {
            tracing::error!(
                product_id = %product_id,
                "Recommended product missing from catalog"
            );
            RecommendationFailure::new(AppError::ProductNotFound(product_id.to_string()), weather)
        })?;

        tracing::info!(
            product_id = %product_id,
            category = %product.category,
            weather = %weather,
            "Recommendation ready"
        );

        Ok(Recommendation {
            recommended_product: product,
            weather,
        })
    }

    fn choose_product(
        &self,
        answer: &QuestionnaireAnswer,
        weather: WeatherCategory,
    ) -> Result<ProductId, AppError> {
        let vector = encode(answer, weather, self.model.schema())?;

        // Inference runs outside the rng lock; the model is shared read-only
        let prediction = self.model.predict(&vector);

        let mut rng = self
            .rng
            .lock()
            .map_err(|e| AppError::Internal(format!("random source unavailable: {}", e)))?;

        let predicted = match prediction {
            Ok(id) => {
                tracing::debug!(
                    predicted = %id,
                    active_columns = vector.active_columns().count(),
                    model = self.model.name(),
                    "Model prediction"
                );
                id
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    model = self.model.name(),
                    "Prediction failed, falling back to a random product"
                );
                self.catalog.random_id(&mut *rng).ok_or_else(|| {
                    AppError::ProductNotFound("catalog is empty".to_string())
                })?
            }
        };

        Ok(coherence::correct(
            &answer.general_product_type,
            predicted,
            &self.catalog,
            &mut *rng,
        ))
    }
}
