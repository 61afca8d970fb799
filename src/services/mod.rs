pub mod catalog;
pub mod coherence;
pub mod encoder;
pub mod forest;
pub mod model;
pub mod providers;
pub mod recommendations;
pub mod training;
pub mod weather;

pub use catalog::ProductCatalog;
pub use model::{ForestModel, PredictionModel};
pub use recommendations::RecommendationEngine;
