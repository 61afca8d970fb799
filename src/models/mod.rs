mod features;
mod product;
mod questionnaire;
mod weather;

pub use features::{Column, FeatureSchema, FeatureVector, Field, SCHEMA_VERSION};
pub use product::{CatalogEntry, ProductId, ProductRecord};
pub use questionnaire::{QuestionnaireAnswer, RecommendationRequest, Recommendation};
pub use weather::{OpenWeatherCondition, OpenWeatherResponse, WeatherCategory};
