use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::WeatherCategory;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Missing questionnaire answers: {0}")]
    MissingFields(String),

    #[error("Product not found in catalog: {0}")]
    ProductNotFound(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Encoding error: {0}")]
    Encoding(#[from] crate::services::encoder::EncodingError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            AppError::HttpClient(_) | AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Encoding(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// A failed recommendation together with the best-known weather at the point of failure
#[derive(Debug)]
pub struct RecommendationFailure {
    pub error: AppError,
    pub weather: WeatherCategory,
}

impl RecommendationFailure {
    pub fn new(error: AppError, weather: WeatherCategory) -> Self {
        Self { error, weather }
    }
}

impl std::fmt::Display for RecommendationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (weather: {})", self.error, self.weather)
    }
}

impl IntoResponse for RecommendationFailure {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = Json(json!({
            "error": self.error.to_string(),
            "weather": self.weather,
        }));

        (status, body).into_response()
    }
}
