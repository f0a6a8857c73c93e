//! Extraction catalog
//!
//! Vocabularies and patterns consumed by the field extractor. This is plain
//! configuration data; it can be loaded from a standalone TOML file or from
//! the `[catalog]` section of the application config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consolidate::clean;

/// Vocabulary and pattern sets for each product field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Known brand names, in priority order
    pub brands: Vec<String>,
    /// Known product types, in priority order
    pub product_types: Vec<String>,
    /// Literal size codes, matched as whole words and case-sensitively
    pub sizes: Vec<String>,
    /// Unit words that may follow a quantity, e.g. "pcs"
    pub count_units: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            brands: owned(&["Miss & Chief", "Himalaya", "Bikano", "Bingo"]),
            product_types: owned(&["Diaper Pants", "baby pants", "Aloo Bhujia", "Tedhe Medhe"]),
            sizes: owned(&["XL"]),
            count_units: owned(&["pants", "pcs"]),
        }
    }
}

impl Catalog {
    /// A catalog with no entries; every field extracts as unknown
    pub fn empty() -> Self {
        Self {
            brands: Vec::new(),
            product_types: Vec::new(),
            sizes: Vec::new(),
            count_units: Vec::new(),
        }
    }

    /// Append the entries of another catalog, skipping exact duplicates
    pub fn merge(&mut self, other: Catalog) {
        fn append(into: &mut Vec<String>, from: Vec<String>) {
            for entry in from {
                if !into.contains(&entry) {
                    into.push(entry);
                }
            }
        }

        append(&mut self.brands, other.brands);
        append(&mut self.product_types, other.product_types);
        append(&mut self.sizes, other.sizes);
        append(&mut self.count_units, other.count_units);
    }

    /// Lowercase words of the brand and product type entries, as they
    /// appear in cleaned text
    pub fn vocabulary_words(&self) -> Vec<String> {
        self.brands
            .iter()
            .chain(&self.product_types)
            .flat_map(|entry| {
                clean(entry)
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Load a catalog from a TOML file
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {:?}", path))?;
    let catalog: Catalog = toml::from_str(&content)
        .with_context(|| format!("Failed to parse catalog {:?}", path))?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.brands.contains(&"Himalaya".to_string()));
        assert!(catalog.product_types.contains(&"baby pants".to_string()));
        assert_eq!(catalog.sizes, vec!["XL"]);
        assert_eq!(catalog.count_units, vec!["pants", "pcs"]);
    }

    #[test]
    fn test_load_partial_catalog() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "brands = [\"Dettol\", \"Dove\"]").unwrap();
        writeln!(temp_file, "sizes = [\"M\", \"L\"]").unwrap();

        let catalog = load_catalog(temp_file.path()).unwrap();
        assert_eq!(catalog.brands, vec!["Dettol", "Dove"]);
        assert_eq!(catalog.sizes, vec!["M", "L"]);
        // Missing keys fall back to defaults
        assert_eq!(catalog.count_units, Catalog::default().count_units);
    }

    #[test]
    fn test_load_catalog_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "brands = [unterminated").unwrap();
        assert!(load_catalog(temp_file.path()).is_err());
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut catalog = Catalog::default();
        let mut extra = Catalog::empty();
        extra.brands = vec!["Bingo".to_string(), "Fortune".to_string()];
        catalog.merge(extra);

        assert_eq!(catalog.brands.iter().filter(|b| *b == "Bingo").count(), 1);
        assert_eq!(catalog.brands.last().map(String::as_str), Some("Fortune"));
    }

    #[test]
    fn test_vocabulary_words_are_cleaned_and_split() {
        let mut catalog = Catalog::empty();
        catalog.brands = vec!["Miss & Chief".to_string(), "Bingo".to_string()];
        catalog.product_types = vec!["Mad Angles".to_string()];
        catalog.sizes = vec!["XL".to_string()];

        assert_eq!(
            catalog.vocabulary_words(),
            vec!["miss", "chief", "bingo", "mad", "angles"]
        );
    }
}
