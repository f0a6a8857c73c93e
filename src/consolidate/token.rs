//! Token data structures produced by the OCR layer

use serde::{Deserialize, Serialize};

/// Top-left corner of a recognized word box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Left edge in pixels
    pub x: i32,
    /// Top edge in pixels
    pub y: i32,
}

/// A single recognized piece of text
///
/// Word-level OCR yields tokens with a position and confidence. A plain-text
/// OCR pass yields a single positionless token holding the whole pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Recognized text
    pub text: String,
    /// Word box position, if the engine reported one
    pub position: Option<Position>,
    /// Engine-native confidence, if the engine reported one
    pub confidence: Option<i32>,
}

impl Token {
    /// Create a positioned word token
    pub fn word(text: impl Into<String>, x: i32, y: i32, confidence: i32) -> Self {
        Self {
            text: text.into(),
            position: Some(Position { x, y }),
            confidence: Some(confidence),
        }
    }

    /// Create a positionless token from a raw text pass
    pub fn phrase(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: None,
            confidence: None,
        }
    }
}

/// Output of one OCR call for one (variant, engine config) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutput {
    /// Word-level tokens with positions
    Tokens(Vec<Token>),
    /// Raw recognized text
    Text(String),
}

impl OcrOutput {
    /// Whether the engine recognized nothing
    pub fn is_empty(&self) -> bool {
        match self {
            OcrOutput::Tokens(tokens) => tokens.is_empty(),
            OcrOutput::Text(text) => text.trim().is_empty(),
        }
    }
}
