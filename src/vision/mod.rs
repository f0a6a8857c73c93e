//! Vision/OCR Layer
//!
//! External collaborators of the consolidation pipeline: image variant
//! generation and the OCR engine. Supports:
//! - Five preprocessing variants built on `imageproc`
//! - Tesseract via its command-line binary

pub mod ocr;
pub mod ocr_preprocess;
pub mod tesseract;

pub use ocr::{EngineConfig, OcrEngine, OcrError, OutputKind};
pub use ocr_preprocess::Variant;
pub use tesseract::TesseractCli;
