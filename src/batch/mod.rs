//! Batch Driver
//!
//! Runs the scanner over a list of image identifiers. Every image gets its
//! own result; a failure on one image never affects another, and results
//! come back in input order.

pub mod source;

pub use source::{AcquireError, FsImageSource, ImageSource};

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::ProductRecord;
use crate::scanner::ProductScanner;

/// Outcome for one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchResult {
    Success {
        #[serde(rename = "Image")]
        image: String,
        #[serde(rename = "Extracted Text")]
        extracted_text: String,
        #[serde(rename = "Product Info")]
        product_info: ProductRecord,
    },
    Failure {
        #[serde(rename = "Image")]
        image: String,
        #[serde(rename = "Error")]
        error: String,
    },
}

impl BatchResult {
    /// Identifier of the image this result belongs to
    pub fn image(&self) -> &str {
        match self {
            BatchResult::Success { image, .. } | BatchResult::Failure { image, .. } => image,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchResult::Success { .. })
    }
}

/// Runs one scanner over many images
pub struct BatchDriver<'a> {
    source: &'a dyn ImageSource,
    scanner: &'a ProductScanner,
    workers: usize,
}

impl<'a> BatchDriver<'a> {
    pub fn new(source: &'a dyn ImageSource, scanner: &'a ProductScanner) -> Self {
        Self {
            source,
            scanner,
            workers: 1,
        }
    }

    /// Process images on up to `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Process a single image, converting every failure into a result
    pub fn process_one(&self, id: &str) -> BatchResult {
        let image = match self.source.load(id) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping {}: {}", id, e);
                return BatchResult::Failure {
                    image: id.to_string(),
                    error: e.to_string(),
                };
            }
        };

        match self.scanner.scan(&image) {
            Ok(outcome) => {
                info!(
                    "Scanned {} in {}ms ({} passes, {} failed)",
                    id, outcome.processing_time_ms, outcome.passes, outcome.failed_passes
                );
                BatchResult::Success {
                    image: id.to_string(),
                    extracted_text: outcome.text.as_str().to_string(),
                    product_info: outcome.record,
                }
            }
            Err(e) => {
                warn!("OCR failed for {}: {}", id, e);
                BatchResult::Failure {
                    image: id.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Process every identifier, returning results in input order
    pub fn run<S: AsRef<str> + Sync>(&self, ids: &[S]) -> Vec<BatchResult> {
        let workers = self.workers.min(ids.len());
        if workers <= 1 {
            return ids.iter().map(|id| self.process_one(id.as_ref())).collect();
        }

        info!("Processing {} images on {} workers", ids.len(), workers);

        let (job_tx, job_rx) = unbounded::<usize>();
        let (result_tx, result_rx) = unbounded::<(usize, BatchResult)>();
        for index in 0..ids.len() {
            let _ = job_tx.send(index);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for index in job_rx.iter() {
                        let result = self.process_one(ids[index].as_ref());
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<BatchResult>> = vec![None; ids.len()];
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .zip(ids)
            .map(|(slot, id)| {
                slot.unwrap_or_else(|| BatchResult::Failure {
                    image: id.as_ref().to_string(),
                    error: "Worker exited before processing this image".to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::{OcrOutput, PipelineMode, Token};
    use crate::scanner::tests::{blank_image, scanner_with, FakeEngine};
    use image::{DynamicImage, RgbImage};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// In-memory source with a fixed set of images
    struct MapSource(HashMap<String, DynamicImage>);

    impl ImageSource for MapSource {
        fn load(&self, id: &str) -> Result<DynamicImage, AcquireError> {
            self.0.get(id).cloned().ok_or_else(|| AcquireError::NotFound {
                path: id.into(),
            })
        }
    }

    fn words_engine() -> Arc<FakeEngine> {
        Arc::new(FakeEngine::returning(OcrOutput::Tokens(vec![
            Token::word("Himalaya", 0, 0, 95),
            Token::word("XL", 0, 20, 95),
        ])))
    }

    #[test]
    fn test_missing_image_isolated() {
        let dir = TempDir::new().unwrap();
        for name in ["valid1.png", "valid2.png"] {
            RgbImage::from_pixel(6, 6, image::Rgb([240, 240, 240]))
                .save(dir.path().join(name))
                .unwrap();
        }

        let source = FsImageSource::with_base_dir(dir.path());
        let scanner = scanner_with(words_engine(), PipelineMode::Positional);
        let results = BatchDriver::new(&source, &scanner).run(&["valid1.png", "missing.png", "valid2.png"]);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert_eq!(results[1].image(), "missing.png");
        match &results[2] {
            BatchResult::Success { extracted_text, product_info, .. } => {
                assert_eq!(extracted_text, "Himalaya XL");
                assert_eq!(product_info.brand, "Himalaya");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_engine_failure_becomes_error_result() {
        let source = MapSource(HashMap::from([("a".to_string(), blank_image())]));
        let scanner = scanner_with(Arc::new(FakeEngine::failing()), PipelineMode::Flat);

        let results = BatchDriver::new(&source, &scanner).run(&["a"]);
        match &results[0] {
            BatchResult::Failure { error, .. } => assert!(error.contains("OCR passes failed")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_workers_preserve_order() {
        let ids: Vec<String> = (0..12).map(|i| format!("img{}", i)).collect();
        let images = ids
            .iter()
            .filter(|id| *id != "img5")
            .map(|id| (id.clone(), blank_image()))
            .collect();
        let source = MapSource(images);
        let scanner = scanner_with(words_engine(), PipelineMode::Positional);

        let results = BatchDriver::new(&source, &scanner).with_workers(4).run(&ids);

        assert_eq!(results.len(), ids.len());
        for (result, id) in results.iter().zip(&ids) {
            assert_eq!(result.image(), id);
            assert_eq!(result.is_success(), id != "img5");
        }
    }

    #[test]
    fn test_empty_batch() {
        let source = MapSource(HashMap::new());
        let scanner = scanner_with(words_engine(), PipelineMode::Positional);
        let results = BatchDriver::new(&source, &scanner).with_workers(3).run::<&str>(&[]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_result_json_shape() {
        let failure = BatchResult::Failure {
            image: "x.jpg".to_string(),
            error: "Unable to read the image file".to_string(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["Image"], "x.jpg");
        assert!(json.get("Product Info").is_none());

        let success = BatchResult::Success {
            image: "y.jpg".to_string(),
            extracted_text: "Bingo".to_string(),
            product_info: ProductRecord::unknown(),
        };
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json["Product Info"]["Product Type"], "Unknown");
        assert!(json.get("Error").is_none());
    }
}
