use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    fmt::Display,
    hash::{DefaultHasher, Hash, Hasher},
};

/// Current layout version of [`FeatureSchema`]
pub const SCHEMA_VERSION: u32 = 1;

/// One of the five categorical model inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "tipo_producto_general")]
    GeneralProductType,
    #[serde(rename = "tipo_antojo")]
    CravingType,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "tipo_sabor")]
    FlavorType,
    #[serde(rename = "weather")]
    Weather,
}

impl Field {
    /// Fields in column-group order
    pub const ALL: [Field; 5] = [
        Field::GeneralProductType,
        Field::CravingType,
        Field::Base,
        Field::FlavorType,
        Field::Weather,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::GeneralProductType => "tipo_producto_general",
            Field::CravingType => "tipo_antojo",
            Field::Base => "base",
            Field::FlavorType => "tipo_sabor",
            Field::Weather => "weather",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(field, value)` indicator column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Column {
    pub field: Field,
    pub value: String,
}

impl Column {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.field, self.value)
    }
}

/// Ordered indicator columns frozen when the model was fit
///
/// Columns are grouped by field in [`Field::ALL`] order and sorted by value
/// inside each group. The schema is stored next to the fitted model and
/// consumed verbatim at inference time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    columns: Vec<Column>,
}

impl FeatureSchema {
    /// Builds a schema from an explicit column list, keeping the given order
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            columns,
        }
    }

    /// Builds a schema from every `(field, value)` pair observed in training rows
    pub fn from_observations<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (Field, &'a str)>,
    {
        let mut seen: HashMap<Field, BTreeSet<&'a str>> = HashMap::new();
        for (field, value) in observations {
            seen.entry(field).or_default().insert(value);
        }

        let columns = Field::ALL
            .iter()
            .flat_map(|field| {
                seen.get(field)
                    .into_iter()
                    .flatten()
                    .map(move |value| Column::new(*field, *value))
            })
            .collect();

        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column display names, e.g. `tipo_producto_general_Agua`
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(Column::to_string).collect()
    }

    /// Identity of this exact column set and order within the running process
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.version.hash(&mut hasher);
        self.columns.hash(&mut hasher);
        hasher.finish()
    }
}

/// 0/1 indicators aligned to the schema they were encoded against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    values: Vec<u8>,
    schema_fingerprint: u64,
}

impl FeatureVector {
    pub fn new(values: Vec<u8>, schema_fingerprint: u64) -> Self {
        Self {
            values,
            schema_fingerprint,
        }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn schema_fingerprint(&self) -> u64 {
        self.schema_fingerprint
    }

    /// Indices of the set indicators
    pub fn active_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0)
            .map(|(index, _)| index)
    }
}
