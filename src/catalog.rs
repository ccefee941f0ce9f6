//! Static local catalog: read once at startup, annotated per request.

use std::path::Path;

use serde_json::Value;

use crate::domain::aggregates::{Product, RawProduct};
use crate::domain::value_objects::fold_script_digits;
use crate::{CatalogError, Result};

/// The bundled, pre-migrated product list. Read-only after load.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<RawProduct>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents).map_err(|e| CatalogError::CatalogFormat(e.to_string()))?;
        let Value::Array(entries) = value else {
            return Err(CatalogError::CatalogFormat(format!("{} does not hold an array", path.display())));
        };
        Ok(Self::from_values(entries))
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { entries: values.into_iter().map(RawProduct::from_value).collect() }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Every entry as a catalog product. Synthetic timestamps depend only on
    /// the entry's position, so repeated calls agree.
    pub fn products(&self) -> Vec<Product> {
        self.entries.iter().cloned().enumerate().map(|(index, raw)| Product::from_catalog(raw, index)).collect()
    }

    /// Lookup by `_id`, `id` or slug. The needle is percent-decoded and
    /// script digits folded (`h₂o` → `h2o`) before a case-insensitive match;
    /// an exact match on the undecoded needle is accepted too.
    pub fn find(&self, needle: &str) -> Result<Product> {
        let decoded = urlencoding::decode(needle).map(|d| d.into_owned()).unwrap_or_else(|_| needle.to_string());
        let folded = fold_script_digits(&decoded);
        let normalized = folded.trim().to_lowercase();

        self.products()
            .into_iter()
            .find(|p| {
                let id = p.id.to_string();
                p.key.to_lowercase() == normalized
                    || p.slug.trim().to_lowercase() == normalized
                    || id.to_lowercase() == normalized
                    || p.key == folded
                    || id == folded
                    || p.slug == folded
            })
            .ok_or(CatalogError::ProductNotFound)
    }
}
