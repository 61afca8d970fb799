use serde::Deserialize;
use std::{collections::BTreeSet, io::Read, path::Path};

use crate::{
    models::{FeatureSchema, Field, ProductId, QuestionnaireAnswer, WeatherCategory},
    services::{
        encoder::{encode, EncodingError},
        forest::{ForestError, ForestParams, RandomForest},
        model::ModelArtifact,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum TrainingError {
    #[error("failed to read sales data: {0}")]
    Csv(#[from] csv::Error),

    #[error("sales data has no rows")]
    NoRecords,

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("row {row}: {source}")]
    Encoding { row: usize, source: EncodingError },

    #[error("model fitting failed: {0}")]
    Fit(#[from] ForestError),
}

/// One historical sale, as found in the sales CSV
#[derive(Debug, Clone, Deserialize)]
pub struct SalesRecord {
    pub tipo_producto_general: String,
    pub tipo_antojo: String,
    pub base: String,
    pub tipo_sabor: String,
    pub weather: String,
    pub product_id: String,
}

/// A validated training example
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub answer: QuestionnaireAnswer,
    pub weather: WeatherCategory,
    pub product_id: ProductId,
}

impl TrainingExample {
    fn from_record(row: usize, record: SalesRecord) -> Result<Self, TrainingError> {
        let weather = record
            .weather
            .parse::<WeatherCategory>()
            .map_err(|message| TrainingError::InvalidRow { row, message })?;

        let product_id = record.product_id.trim();
        if product_id.is_empty() {
            return Err(TrainingError::InvalidRow {
                row,
                message: "empty product_id".to_string(),
            });
        }

        Ok(Self {
            answer: QuestionnaireAnswer::new(
                record.tipo_producto_general,
                record.tipo_antojo,
                record.base,
                record.tipo_sabor,
            ),
            weather,
            product_id: ProductId::from(product_id),
        })
    }
}

/// Reads sales rows from CSV with a header line
pub fn read_sales<R: Read>(reader: R) -> Result<Vec<TrainingExample>, TrainingError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut examples = Vec::new();
    for (index, record) in csv_reader.deserialize::<SalesRecord>().enumerate() {
        // Row numbers count the header as row 1
        examples.push(TrainingExample::from_record(index + 2, record?)?);
    }

    if examples.is_empty() {
        return Err(TrainingError::NoRecords);
    }
    Ok(examples)
}

/// Reads sales rows from a CSV file
pub fn read_sales_file(path: impl AsRef<Path>) -> Result<Vec<TrainingExample>, TrainingError> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    read_sales(file)
}

/// Fits a model on training examples and packages it with its schema
pub fn train(
    examples: &[TrainingExample],
    params: &ForestParams,
) -> Result<ModelArtifact, TrainingError> {
    if examples.is_empty() {
        return Err(TrainingError::NoRecords);
    }

    // 1. Freeze the column schema from every observed value
    let schema = FeatureSchema::from_observations(examples.iter().flat_map(|example| {
        Field::ALL.iter().map(move |field| {
            (
                *field,
                example.answer.value(*field).unwrap_or(example.weather.as_str()),
            )
        })
    }));

    // 2. Encode every row against it
    let samples = examples
        .iter()
        .enumerate()
        .map(|(index, example)| {
            encode(&example.answer, example.weather, &schema)
                .map(|vector| vector.values().to_vec())
                .map_err(|source| TrainingError::Encoding {
                    row: index + 2,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // 3. Map product ids to class indices
    let classes: Vec<ProductId> = examples
        .iter()
        .map(|example| example.product_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let labels: Vec<usize> = examples
        .iter()
        .map(|example| {
            classes
                .binary_search(&example.product_id)
                .unwrap_or_default()
        })
        .collect();

    // 4. Fit
    let forest = RandomForest::fit(&samples, &labels, classes.len(), params)?;

    tracing::info!(
        rows = examples.len(),
        columns = schema.len(),
        classes = classes.len(),
        trees = forest.n_trees(),
        "Model trained"
    );

    Ok(ModelArtifact::new(schema, classes, forest))
}
