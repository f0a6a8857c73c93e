//! Single-image pipeline
//!
//! Runs every configured variant through every engine config, pools the
//! results, consolidates them and extracts the product record.

use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consolidate::{
    consolidate, AdmissionFilter, CandidatePool, ConsolidateOptions, ConsolidatedText,
    PipelineMode,
};
use crate::extract::{FieldExtractor, ProductRecord};
use crate::vision::{EngineConfig, OcrEngine, OcrError, OutputKind, Variant};

/// Errors scanning one image
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("All {attempted} OCR passes failed; last error: {last}")]
    AllPassesFailed { attempted: usize, last: OcrError },
}

/// Result of scanning one image
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Consolidated transcript (or the empty sentinel)
    pub text: ConsolidatedText,
    /// Extracted product attributes
    pub record: ProductRecord,
    /// Number of OCR calls attempted
    pub passes: usize,
    /// Number of OCR calls that failed and were skipped
    pub failed_passes: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Pipeline for turning one product photo into text and a record
pub struct ProductScanner {
    engine: Arc<dyn OcrEngine>,
    variants: Vec<Variant>,
    engine_configs: Vec<EngineConfig>,
    filter: AdmissionFilter,
    options: ConsolidateOptions,
    extractor: FieldExtractor,
}

impl ProductScanner {
    /// Create a scanner
    ///
    /// `variants` and `engine_configs` must be non-empty; see
    /// [`crate::config::AppConfig::validate`].
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        variants: Vec<Variant>,
        engine_configs: Vec<EngineConfig>,
        filter: AdmissionFilter,
        options: ConsolidateOptions,
        extractor: FieldExtractor,
    ) -> Self {
        Self {
            engine,
            variants,
            engine_configs,
            filter,
            options,
            extractor,
        }
    }

    pub fn mode(&self) -> PipelineMode {
        self.options.mode
    }

    /// Run every OCR pass over an image and gather the candidate pool
    fn collect(&self, image: &DynamicImage) -> Result<(CandidatePool, usize), ScanError> {
        let kind = match self.options.mode {
            PipelineMode::Positional => OutputKind::Words,
            PipelineMode::Flat => OutputKind::Text,
        };

        let mut pool = CandidatePool::new(self.filter.clone());
        let mut attempted = 0;
        let mut failed = 0;
        let mut last_error = None;

        for variant in &self.variants {
            let processed = variant.apply(image);
            for config in &self.engine_configs {
                attempted += 1;
                match self.engine.recognize(&processed, config, kind) {
                    Ok(output) => {
                        debug!(
                            "{} [{}] on {}: {}",
                            self.engine.name(),
                            config,
                            variant,
                            if output.is_empty() { "empty" } else { "text found" }
                        );
                        pool.extend(output);
                    }
                    Err(e) => {
                        warn!("{} [{}] on {} failed: {}", self.engine.name(), config, variant, e);
                        failed += 1;
                        last_error = Some(e);
                    }
                }
            }
        }

        if let Some(last) = last_error {
            if failed == attempted {
                return Err(ScanError::AllPassesFailed { attempted, last });
            }
        }

        Ok((pool, failed))
    }

    /// Scan one image end to end
    pub fn scan(&self, image: &DynamicImage) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let (pool, failed_passes) = self.collect(image)?;
        let text = consolidate(pool, &self.options);

        // Nothing to mine from the sentinel
        let record = match &text {
            ConsolidatedText::Found(found) => self.extractor.extract(found),
            ConsolidatedText::Nothing(_) => ProductRecord::unknown(),
        };

        Ok(ScanOutcome {
            text,
            record,
            passes: self.variants.len() * self.engine_configs.len(),
            failed_passes,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
