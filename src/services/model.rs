use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    models::{FeatureSchema, FeatureVector, ProductId, SCHEMA_VERSION},
    services::forest::{ForestError, RandomForest},
};

/// Version of the on-disk model artifact layout
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("feature vector does not match the fitted schema: {0}")]
    SchemaMismatch(String),

    #[error("invalid feature vector: {0}")]
    InvalidInput(String),

    #[error("model has no trees")]
    EmptyModel,

    #[error("model voted for unknown class {0}")]
    UnknownClass(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Format(#[from] serde_json::Error),

    #[error("unsupported model artifact format {found}, expected {expected}")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("unsupported feature schema version {found}, expected {expected}")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("model artifact is inconsistent: {0}")]
    Inconsistent(String),
}

impl ModelError {
    /// Operator hint for a model file that does not exist yet
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ModelError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Some("run `cargo run --bin train` to create the model artifact")
            }
            _ => None,
        }
    }
}

/// Classifier contract used by the recommendation engine
///
/// Implementations are loaded once and shared read-only between requests.
#[cfg_attr(test, mockall::automock)]
pub trait PredictionModel: Send + Sync {
    /// Column schema the model was fit against
    fn schema(&self) -> &FeatureSchema;

    /// Predicts a product identifier for an encoded questionnaire
    fn predict(&self, vector: &FeatureVector) -> Result<ProductId, PredictionError>;

    /// Model name for logging and health reporting
    fn name(&self) -> &'static str;
}

/// Persisted `(fitted model, trained column schema)` pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub schema: FeatureSchema,
    /// Product identifier for each class index of the forest
    pub classes: Vec<ProductId>,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(schema: FeatureSchema, classes: Vec<ProductId>, forest: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            schema,
            classes,
            forest,
        }
    }

    /// Reads an artifact from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        artifact.check()?;
        Ok(artifact)
    }

    /// Writes the artifact as JSON, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let io_error = |source| ModelError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(io_error)
    }

    /// Verifies that the schema, class list and forest belong together
    fn check(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat {
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        if self.schema.version != SCHEMA_VERSION {
            return Err(ModelError::UnsupportedSchema {
                found: self.schema.version,
                expected: SCHEMA_VERSION,
            });
        }
        if self.schema.len() != self.forest.n_features() {
            return Err(ModelError::Inconsistent(format!(
                "schema has {} columns but the forest was fit on {}",
                self.schema.len(),
                self.forest.n_features()
            )));
        }
        if self.classes.len() != self.forest.n_classes() {
            return Err(ModelError::Inconsistent(format!(
                "{} class labels for a forest with {} classes",
                self.classes.len(),
                self.forest.n_classes()
            )));
        }
        self.forest
            .check()
            .map_err(|e| ModelError::Inconsistent(e.to_string()))
    }
}

/// Random forest classifier behind the [`PredictionModel`] contract
#[derive(Debug)]
pub struct ForestModel {
    schema: FeatureSchema,
    schema_fingerprint: u64,
    classes: Vec<ProductId>,
    forest: RandomForest,
}

impl ForestModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.check()?;
        Ok(Self {
            schema_fingerprint: artifact.schema.fingerprint(),
            schema: artifact.schema,
            classes: artifact.classes,
            forest: artifact.forest,
        })
    }

    /// Loads and validates a model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let model = Self::from_artifact(ModelArtifact::load(path)?)?;

        tracing::info!(
            columns = model.schema.len(),
            classes = model.classes.len(),
            trees = model.forest.n_trees(),
            "Loaded prediction model"
        );

        Ok(model)
    }

    pub fn classes(&self) -> &[ProductId] {
        &self.classes
    }
}

impl PredictionModel for ForestModel {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict(&self, vector: &FeatureVector) -> Result<ProductId, PredictionError> {
        if vector.schema_fingerprint() != self.schema_fingerprint {
            return Err(PredictionError::SchemaMismatch(
                "vector was encoded against a different column schema".to_string(),
            ));
        }

        let class = self.forest.predict(vector.values()).map_err(|e| match e {
            ForestError::NoTrees => PredictionError::EmptyModel,
            ForestError::WidthMismatch { .. } | ForestError::ColumnOutOfRange { .. } => {
                PredictionError::SchemaMismatch(e.to_string())
            }
            other => PredictionError::InvalidInput(other.to_string()),
        })?;

        self.classes
            .get(class)
            .cloned()
            .ok_or(PredictionError::UnknownClass(class))
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Column, Field, QuestionnaireAnswer, WeatherCategory},
        services::{encoder::encode, forest::ForestParams},
    };

    fn artifact() -> ModelArtifact {
        let schema = FeatureSchema::new(vec![
            Column::new(Field::GeneralProductType, "Agua"),
            Column::new(Field::GeneralProductType, "Helado"),
            Column::new(Field::Weather, "sunny"),
        ]);
        let samples = vec![vec![1, 0, 1], vec![0, 1, 1], vec![1, 0, 1], vec![0, 1, 1]];
        let labels = vec![0, 1, 0, 1];
        let forest = RandomForest::fit(
            &samples,
            &labels,
            2,
            &ForestParams {
                n_trees: 15,
                ..ForestParams::default()
            },
        )
        .unwrap();

        ModelArtifact::new(
            schema,
            vec![
                ProductId::from("Agua de Jamaica"),
                ProductId::from("Helado de Coco"),
            ],
            forest,
        )
    }

    #[test]
    fn test_predict_encoded_answer() {
        let model = ForestModel::from_artifact(artifact()).unwrap();
        let answer = QuestionnaireAnswer::new("Helado", "dulce", "leche", "coco");

        let vector = encode(&answer, WeatherCategory::Sunny, model.schema()).unwrap();
        let predicted = model.predict(&vector).unwrap();

        assert_eq!(predicted, ProductId::from("Helado de Coco"));
    }

    #[test]
    fn test_predict_rejects_foreign_schema() {
        let model = ForestModel::from_artifact(artifact()).unwrap();
        let other = FeatureSchema::new(vec![
            Column::new(Field::Weather, "sunny"),
            Column::new(Field::GeneralProductType, "Agua"),
            Column::new(Field::GeneralProductType, "Helado"),
        ]);
        let answer = QuestionnaireAnswer::new("Agua", "dulce", "agua", "fruta");

        let vector = encode(&answer, WeatherCategory::Sunny, &other).unwrap();

        assert!(matches!(
            model.predict(&vector),
            Err(PredictionError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_width_and_values() {
        let model = ForestModel::from_artifact(artifact()).unwrap();
        let fingerprint = model.schema().fingerprint();

        assert!(matches!(
            model.predict(&FeatureVector::new(vec![1, 0], fingerprint)),
            Err(PredictionError::SchemaMismatch(_))
        ));
        assert!(matches!(
            model.predict(&FeatureVector::new(vec![2, 0, 1], fingerprint)),
            Err(PredictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_artifact_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        let original = artifact();
        original.save(&path).unwrap();

        let model = ForestModel::load(&path).unwrap();
        assert_eq!(model.schema(), &original.schema);
        assert_eq!(model.classes(), original.classes.as_slice());
        assert_eq!(model.name(), "random_forest");
    }

    #[test]
    fn test_load_rejects_inconsistent_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut broken = artifact();
        broken.classes.pop();
        // save() does not validate, load() must
        broken.save(&path).unwrap();

        assert!(matches!(
            ForestModel::load(&path),
            Err(ModelError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_load_rejects_unknown_format_version() {
        let mut artifact = artifact();
        artifact.format_version = 99;

        assert!(matches!(
            ForestModel::from_artifact(artifact),
            Err(ModelError::UnsupportedFormat { found: 99, .. })
        ));
    }

    #[test]
    fn test_load_rejects_tree_outside_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut json = serde_json::to_value(artifact()).unwrap();
        json["forest"]["trees"] = serde_json::json!([
            {"split": {"column": 99, "absent": {"leaf": {"class": 0}}, "present": {"leaf": {"class": 1}}}}
        ]);
        std::fs::write(&path, json.to_string()).unwrap();

        match ForestModel::load(&path) {
            Err(ModelError::Inconsistent(message)) => assert!(message.contains("99")),
            other => panic!("expected Inconsistent, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_unknown_schema_version() {
        let mut artifact = artifact();
        artifact.schema.version = SCHEMA_VERSION + 1;

        assert!(matches!(
            ForestModel::from_artifact(artifact),
            Err(ModelError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ForestModel::load("/definitely/not/here/model.json");

        let error = result.unwrap_err();
        assert!(matches!(error, ModelError::Io { .. }));
        assert!(error.hint().unwrap().contains("--bin train"));
    }

    #[test]
    fn test_no_hint_for_malformed_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json").unwrap();

        let error = ForestModel::load(&path).unwrap_err();
        assert!(matches!(error, ModelError::Format(_)));
        assert_eq!(error.hint(), None);
    }
}
