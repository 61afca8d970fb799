use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Catalog key, also the label the model predicts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A product as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    /// Display price, already formatted (e.g. "$25")
    pub price: String,
    pub image: String,
    pub justification: String,
    /// Free-form category tag, matched loosely against the declared product type
    pub category: String,
}

/// One row of a catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: ProductId,
    #[serde(flatten)]
    pub product: ProductRecord,
}
