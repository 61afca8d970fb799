use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{
    error::RecommendationFailure,
    middleware::request_id::RequestId,
    models::{Recommendation, RecommendationRequest},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_products: usize,
    pub model: &'static str,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        catalog_products: state.engine.catalog().len(),
        model: state.engine.model_name(),
    })
}

/// Recommends one product for a completed questionnaire
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Recommendation>, RecommendationFailure> {
    tracing::info!(
        request_id = %request_id,
        general_product_type = ?request.general_product_type,
        "Processing recommendation request"
    );

    let recommendation = state.engine.recommend(request).await.map_err(|failure| {
        tracing::warn!(
            request_id = %request_id,
            error = %failure.error,
            weather = %failure.weather,
            "Recommendation failed"
        );
        failure
    })?;

    tracing::info!(
        request_id = %request_id,
        product = %recommendation.recommended_product.name,
        weather = %recommendation.weather,
        "Recommendation completed"
    );

    Ok(Json(recommendation))
}
