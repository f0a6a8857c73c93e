//! product-ocr - Product package OCR consolidation
//!
//! Runs OCR over several preprocessed variants of each product photo,
//! consolidates the redundant output into one transcript and extracts
//! brand, product type, size and count.
//!
//! Data flows one way: [`vision`] variants and OCR passes feed a
//! [`consolidate::CandidatePool`], which is ordered, cleaned, deduplicated and
//! joined, then mined by [`extract::FieldExtractor`]. [`batch::BatchDriver`]
//! runs that per image and isolates per-image failures.

pub mod batch;
pub mod config;
pub mod consolidate;
pub mod extract;
pub mod scanner;
pub mod storage;
pub mod vision;
