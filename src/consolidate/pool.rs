//! Candidate pool gathered across all OCR passes for one image

use tracing::debug;

use super::token::{OcrOutput, Token};

/// Admission rules applied to every token entering the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionFilter {
    /// Tokens with a known confidence at or below this value are dropped
    pub confidence_floor: Option<i32>,
    /// Tokens with fewer trimmed characters than this are dropped
    pub min_token_chars: usize,
}

impl Default for AdmissionFilter {
    fn default() -> Self {
        Self {
            confidence_floor: Some(60),
            min_token_chars: 2,
        }
    }
}

impl AdmissionFilter {
    /// Check whether a token may enter the pool
    pub fn admits(&self, token: &Token) -> bool {
        if let (Some(floor), Some(confidence)) = (self.confidence_floor, token.confidence) {
            if confidence <= floor {
                return false;
            }
        }
        token.text.trim().chars().count() >= self.min_token_chars.max(1)
    }
}

/// Unordered multiset of tokens for one source image
///
/// Duplicates across variants are expected and kept; they are resolved
/// by the deduplicator later on.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    tokens: Vec<Token>,
    filter: AdmissionFilter,
}

impl CandidatePool {
    /// Create an empty pool with the given admission rules
    pub fn new(filter: AdmissionFilter) -> Self {
        Self {
            tokens: Vec::new(),
            filter,
        }
    }

    /// Add the output of one OCR pass
    pub fn extend(&mut self, output: OcrOutput) {
        let before = self.tokens.len();
        match output {
            OcrOutput::Tokens(tokens) => {
                let filter = &self.filter;
                self.tokens
                    .extend(tokens.into_iter().filter(|t| filter.admits(t)));
            }
            OcrOutput::Text(text) => {
                let token = Token::phrase(text);
                if self.filter.admits(&token) {
                    self.tokens.push(token);
                }
            }
        }
        debug!("Pool admitted {} tokens", self.tokens.len() - before);
    }

    /// Number of admitted tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Consume the pool, yielding tokens in arrival order
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl FromIterator<OcrOutput> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = OcrOutput>>(iter: I) -> Self {
        let mut pool = CandidatePool::default();
        for output in iter {
            pool.extend(output);
        }
        pool
    }
}
