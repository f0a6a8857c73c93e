//! Application Configuration
//!
//! Pipeline settings, OCR settings, the extraction catalog and batch
//! settings, stored in TOML format.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consolidate::{AdmissionFilter, ConsolidateOptions, PipelineMode, DEFAULT_EMPTY_SENTINEL};
use crate::extract::Catalog;
use crate::vision::{EngineConfig, Variant};

/// Keywords a flat-mode phrase must contain at least one of
const DEFAULT_RELEVANCE_WORDS: &[&str] = &[
    "wheat", "pasta", "spaghetti", "noodle", "macaroni", "turmeric", "powder", "dark",
    "fantasy", "penne", "saffola", "oats", "kwality", "choco", "flakes", "kellogs", "chocos",
    "tedhe", "medhe", "good", "day", "fortune", "suji", "kohinoor", "matic", "diaper", "pants",
    "baby", "aloo", "bhujia", "bourn", "vita", "cadbury", "chips", "raw", "peanut", "comfort",
    "cuddles", "super", "dettol", "dove", "ezee", "fab", "godrej", "kachi", "ghani", "mustard",
    "oil", "sugar", "mix", "fruit", "ghadi", "detergent", "happy", "creame", "sandwiches", "huggies",
    "ice", "popz", "basmati", "rice", "lays", "levista", "coffee", "lux", "margo", "surf",
    "excel", "stains", "real", "juice", "nacho", "potato", "peas",
];

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Consolidation settings
    pub pipeline: PipelineConfig,
    /// OCR engine and preprocessing settings
    pub ocr: OcrSettings,
    /// Field extraction vocabularies
    pub catalog: Catalog,
    /// Batch processing settings
    pub batch: BatchSettings,
}

/// Consolidation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Positional (word boxes) or flat (whole text passes)
    pub mode: PipelineMode,
    /// Whether tokens are filtered by confidence at all
    pub confidence_filter: bool,
    /// Tokens with a known confidence at or below this value are dropped
    pub confidence_floor: i32,
    /// Minimum characters for a token to enter the pool
    pub min_token_chars: usize,
    /// Flat-mode keywords, extended with the catalog vocabulary; empty
    /// disables the relevance filter
    pub relevance_words: Vec<String>,
    /// Reported when nothing survives consolidation
    pub empty_sentinel: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Positional,
            confidence_filter: true,
            confidence_floor: 60,
            min_token_chars: 2,
            relevance_words: DEFAULT_RELEVANCE_WORDS.iter().map(|w| w.to_string()).collect(),
            empty_sentinel: DEFAULT_EMPTY_SENTINEL.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn admission_filter(&self) -> AdmissionFilter {
        AdmissionFilter {
            confidence_floor: self.confidence_filter.then_some(self.confidence_floor),
            min_token_chars: self.min_token_chars,
        }
    }
}

/// OCR engine and preprocessing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract binary name or path
    pub binary: String,
    /// Tesseract language code
    pub language: String,
    /// OCR engine mode passed with every pass
    pub oem: u8,
    /// Page segmentation modes to try; empty picks a default for the mode
    pub page_modes: Vec<u8>,
    /// Preprocessing variants to run
    pub variants: Vec<Variant>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            oem: 3,
            page_modes: Vec::new(),
            variants: Variant::ALL.to_vec(),
        }
    }
}

impl OcrSettings {
    /// Engine configs to run for a pipeline mode
    pub fn engine_configs(&self, mode: PipelineMode) -> Vec<EngineConfig> {
        let page_modes: &[u8] = if !self.page_modes.is_empty() {
            &self.page_modes
        } else {
            match mode {
                PipelineMode::Positional => &[6],
                PipelineMode::Flat => &[6, 4, 11],
            }
        };
        page_modes
            .iter()
            .map(|psm| EngineConfig::new(self.oem, *psm))
            .collect()
    }
}

/// Batch processing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Number of images processed concurrently
    pub workers: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

impl AppConfig {
    /// Consolidation options for the pipeline
    ///
    /// A non-empty relevance list also accepts every word of the catalog's
    /// brand and product type entries, so a pass naming only a catalog
    /// product still survives.
    pub fn consolidate_options(&self) -> ConsolidateOptions {
        let pipeline = &self.pipeline;
        let mut words = pipeline.relevance_words.clone();
        if !words.is_empty() {
            words.extend(self.catalog.vocabulary_words());
        }
        ConsolidateOptions::new(pipeline.mode, words, pipeline.empty_sentinel.clone())
    }

    /// Reject configurations that cannot run any OCR pass
    pub fn validate(&self) -> Result<()> {
        if self.ocr.variants.is_empty() {
            bail!("ocr.variants must list at least one preprocessing variant");
        }
        if self.ocr.binary.trim().is_empty() {
            bail!("ocr.binary must not be empty");
        }
        if self.pipeline.empty_sentinel.trim().is_empty() {
            bail!("pipeline.empty_sentinel must not be empty");
        }
        if self.batch.workers == 0 {
            bail!("batch.workers must be at least 1");
        }
        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
