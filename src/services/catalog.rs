use indexmap::IndexMap;
use rand::{seq::IteratorRandom, Rng};
use std::path::Path;

use crate::models::{CatalogEntry, ProductId, ProductRecord};

/// Catalog shipped with the service, used when no catalog file is configured
const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Format(#[from] serde_json::Error),

    #[error("duplicate product id '{0}'")]
    DuplicateProduct(ProductId),
}

/// Immutable product table, in catalog file order
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: IndexMap<ProductId, ProductRecord>,
}

impl ProductCatalog {
    /// Builds a catalog, rejecting repeated product ids
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogEntry>,
    ) -> Result<Self, CatalogError> {
        let mut products = IndexMap::new();
        for entry in entries {
            if products.contains_key(&entry.id) {
                return Err(CatalogError::DuplicateProduct(entry.id));
            }
            products.insert(entry.id, entry.product);
        }
        Ok(Self { products })
    }

    /// Parses a JSON array of catalog entries
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Loads the catalog from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Loads from `path` when given, otherwise uses the embedded catalog
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => Self::load(path)?,
            None => Self::embedded()?,
        };

        tracing::info!(
            products = catalog.len(),
            source = %path.map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
            "Loaded product catalog"
        );

        Ok(catalog)
    }

    pub fn get(&self, id: &ProductId) -> Option<&ProductRecord> {
        self.products.get(id)
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &ProductRecord)> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Uniformly random product id, `None` for an empty catalog
    pub fn random_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ProductId> {
        self.products.keys().choose(rng).cloned()
    }
}
