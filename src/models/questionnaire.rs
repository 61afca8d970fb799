use serde::{Deserialize, Serialize};

use super::{features::Field, ProductRecord, WeatherCategory};
use crate::error::{AppError, AppResult};

/// Raw questionnaire body as posted by the client
///
/// Every answer is optional at this stage so that missing answers surface as
/// `MissingFields` instead of a generic deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(rename = "tipo_producto_general", alias = "generalProductType")]
    pub general_product_type: Option<String>,
    #[serde(rename = "tipo_antojo", alias = "cravingType")]
    pub craving_type: Option<String>,
    pub base: Option<String>,
    #[serde(rename = "tipo_sabor", alias = "flavorType")]
    pub flavor_type: Option<String>,
}

impl RecommendationRequest {
    /// Checks that all four answers are present and non-blank
    pub fn validate(self) -> AppResult<QuestionnaireAnswer> {
        let missing: Vec<&'static str> = [
            (Field::GeneralProductType, &self.general_product_type),
            (Field::CravingType, &self.craving_type),
            (Field::Base, &self.base),
            (Field::FlavorType, &self.flavor_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(field, _)| field.as_str())
        .collect();

        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing.join(", ")));
        }

        Ok(QuestionnaireAnswer {
            general_product_type: self.general_product_type.unwrap_or_default(),
            craving_type: self.craving_type.unwrap_or_default(),
            base: self.base.unwrap_or_default(),
            flavor_type: self.flavor_type.unwrap_or_default(),
        })
    }
}

/// A complete set of questionnaire answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireAnswer {
    #[serde(rename = "tipo_producto_general")]
    pub general_product_type: String,
    #[serde(rename = "tipo_antojo")]
    pub craving_type: String,
    pub base: String,
    #[serde(rename = "tipo_sabor")]
    pub flavor_type: String,
}

impl QuestionnaireAnswer {
    pub fn new(
        general_product_type: impl Into<String>,
        craving_type: impl Into<String>,
        base: impl Into<String>,
        flavor_type: impl Into<String>,
    ) -> Self {
        Self {
            general_product_type: general_product_type.into(),
            craving_type: craving_type.into(),
            base: base.into(),
            flavor_type: flavor_type.into(),
        }
    }

    /// Answer for a questionnaire field; `None` for the weather field
    pub fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::GeneralProductType => Some(&self.general_product_type),
            Field::CravingType => Some(&self.craving_type),
            Field::Base => Some(&self.base),
            Field::FlavorType => Some(&self.flavor_type),
            Field::Weather => None,
        }
    }
}

/// Successful recommendation response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub recommended_product: ProductRecord,
    pub weather: WeatherCategory,
}
