//! OCR (Optical Character Recognition) engine abstraction
//!
//! The consolidation pipeline only needs "image + engine config -> tokens or
//! text". Engines implement [`OcrEngine`]; the Tesseract command-line adapter
//! lives in [`super::tesseract`].

use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consolidate::OcrOutput;

/// Errors from OCR engines
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Could not encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of output to request from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Word boxes with positions and confidences
    Words,
    /// Plain recognized text
    Text,
}

/// Engine configuration for one OCR pass
///
/// Mirrors Tesseract's engine mode and page segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineConfig {
    /// OCR engine mode (3 = default LSTM/legacy choice)
    pub oem: u8,
    /// Page segmentation mode (6 = single block, 4 = column, 11 = sparse)
    pub psm: u8,
}

impl EngineConfig {
    pub const fn new(oem: u8, psm: u8) -> Self {
        Self { oem, psm }
    }

    /// Command-line arguments for this config
    pub fn args(&self) -> [String; 4] {
        [
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ]
    }
}

impl std::fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "--oem {} --psm {}", self.oem, self.psm)
    }
}

/// Trait for OCR engines
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs
    fn name(&self) -> &str;

    /// Run OCR on one preprocessed image
    ///
    /// An image with no recognizable text yields empty output, not an error.
    fn recognize(
        &self,
        image: &GrayImage,
        config: &EngineConfig,
        kind: OutputKind,
    ) -> Result<OcrOutput, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_display() {
        assert_eq!(EngineConfig::new(3, 11).to_string(), "--oem 3 --psm 11");
    }

    #[test]
    fn test_engine_config_args() {
        let args = EngineConfig::new(3, 6).args();
        assert_eq!(args, ["--oem", "3", "--psm", "6"].map(String::from));
    }

    #[test]
    fn test_error_messages() {
        let err = OcrError::EngineNotAvailable("tesseract not found".to_string());
        assert_eq!(err.to_string(), "OCR engine not available: tesseract not found");
    }
}
