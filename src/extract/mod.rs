//! Field Extraction
//!
//! Mines structured product attributes from consolidated text using the
//! vocabularies in a [`Catalog`]. Each field rule runs independently and
//! falls back to [`UNKNOWN`] when nothing matches.

pub mod catalog;

pub use catalog::{load_catalog, Catalog};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consolidate::clean;

/// Value reported for a field with no match
pub const UNKNOWN: &str = "Unknown";

/// Errors building an extractor from a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Structured attributes of one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Product Type")]
    pub product_type: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Count")]
    pub count: String,
}

impl ProductRecord {
    /// A record with every field unknown
    pub fn unknown() -> Self {
        Self {
            brand: UNKNOWN.to_string(),
            product_type: UNKNOWN.to_string(),
            size: UNKNOWN.to_string(),
            count: UNKNOWN.to_string(),
        }
    }

    /// Field labels and values in display order
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Brand", self.brand.as_str()),
            ("Product Type", self.product_type.as_str()),
            ("Size", self.size.as_str()),
            ("Count", self.count.as_str()),
        ]
    }
}

/// Matches text against a vocabulary and reports the canonical entry
#[derive(Debug)]
struct VocabularyRule {
    pattern: Option<Regex>,
    /// (cleaned lowercase key, configured entry)
    entries: Vec<(String, String)>,
}

impl VocabularyRule {
    fn new(field: &'static str, vocabulary: &[String]) -> Result<Self, CatalogError> {
        let mut entries = Vec::new();
        let mut alternatives = Vec::new();

        for entry in vocabulary {
            let key = clean(entry);
            if key.is_empty() {
                continue;
            }
            let words: Vec<String> = key.split(' ').map(regex::escape).collect();
            alternatives.push(words.join(r"\s+"));
            entries.push((key.to_lowercase(), entry.trim().to_string()));
        }

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let source = format!("(?:{})", alternatives.join("|"));
            let regex = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|source| CatalogError::InvalidPattern { field, source })?;
            Some(regex)
        };

        Ok(Self { pattern, entries })
    }

    fn find(&self, text: &str) -> Option<String> {
        let found = self.pattern.as_ref()?.find(text)?;
        let key = found
            .as_str()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        self.entries
            .iter()
            .find(|(entry_key, _)| *entry_key == key)
            .map(|(_, entry)| entry.clone())
            .or_else(|| Some(found.as_str().to_string()))
    }
}

/// Applies the fixed set of field rules to consolidated text
#[derive(Debug)]
pub struct FieldExtractor {
    brand: VocabularyRule,
    product_type: VocabularyRule,
    size: Option<Regex>,
    count: Option<Regex>,
}

impl FieldExtractor {
    /// Compile the rules for a catalog
    pub fn new(catalog: &Catalog) -> Result<Self, CatalogError> {
        let brand = VocabularyRule::new("brand", &catalog.brands)?;
        let product_type = VocabularyRule::new("product type", &catalog.product_types)?;

        let sizes: Vec<String> = catalog
            .sizes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(regex::escape)
            .collect();
        let size = if sizes.is_empty() {
            None
        } else {
            let source = format!(r"\b(?:{})\b", sizes.join("|"));
            Some(
                Regex::new(&source)
                    .map_err(|source| CatalogError::InvalidPattern { field: "size", source })?,
            )
        };

        let units: Vec<String> = catalog
            .count_units
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(regex::escape)
            .collect();
        let count = if units.is_empty() {
            None
        } else {
            let source = format!(r"\d+\s*(?:{})\b", units.join("|"));
            Some(
                RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CatalogError::InvalidPattern { field: "count", source })?,
            )
        };

        Ok(Self {
            brand,
            product_type,
            size,
            count,
        })
    }

    /// Extract a product record from consolidated text
    pub fn extract(&self, text: &str) -> ProductRecord {
        let first_match = |regex: &Option<Regex>| {
            regex
                .as_ref()
                .and_then(|r| r.find(text))
                .map(|m| m.as_str().to_string())
        };

        ProductRecord {
            brand: self.brand.find(text).unwrap_or_else(|| UNKNOWN.to_string()),
            product_type: self
                .product_type
                .find(text)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            size: first_match(&self.size).unwrap_or_else(|| UNKNOWN.to_string()),
            count: first_match(&self.count).unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}
