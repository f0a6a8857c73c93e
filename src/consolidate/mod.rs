//! Consolidation Layer
//!
//! Turns the redundant, unordered output of many OCR passes into one
//! transcript: pool -> reading order -> clean -> dedup -> join.

pub mod clean;
pub mod dedup;
pub mod order;
pub mod pool;
pub mod token;

pub use clean::clean;
pub use dedup::dedup_case_insensitive;
pub use order::reading_order;
pub use pool::{AdmissionFilter, CandidatePool};
pub use token::{OcrOutput, Position, Token};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Sentinel reported when a scan ran but nothing survived consolidation
pub const DEFAULT_EMPTY_SENTINEL: &str = "No relevant words found";

/// Which kind of OCR output the pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Word boxes with positions, deduplicated word by word
    #[default]
    Positional,
    /// Whole text passes, deduplicated pass by pass
    Flat,
}

impl PipelineMode {
    /// Delimiter placed between deduplicated elements
    pub fn delimiter(&self) -> &'static str {
        match self {
            PipelineMode::Positional => " ",
            PipelineMode::Flat => " | ",
        }
    }
}

/// Options steering consolidation of one pool
#[derive(Debug, Clone)]
pub struct ConsolidateOptions {
    pub mode: PipelineMode,
    /// Lowercased keywords; a flat-mode phrase must contain one to be kept
    pub relevance_words: HashSet<String>,
    /// Text reported when nothing survives
    pub empty_sentinel: String,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Positional,
            relevance_words: HashSet::new(),
            empty_sentinel: DEFAULT_EMPTY_SENTINEL.to_string(),
        }
    }
}

impl ConsolidateOptions {
    /// Build options, normalizing relevance words to trimmed lowercase
    pub fn new<I, S>(mode: PipelineMode, relevance_words: I, empty_sentinel: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mode,
            relevance_words: relevance_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            empty_sentinel: empty_sentinel.into(),
        }
    }

    fn is_relevant(&self, phrase: &str) -> bool {
        if self.mode != PipelineMode::Flat || self.relevance_words.is_empty() {
            return true;
        }
        phrase
            .split_whitespace()
            .any(|word| self.relevance_words.contains(&word.to_lowercase()))
    }
}

/// Final transcript for one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsolidatedText {
    /// Deduplicated elements joined by the mode delimiter
    Found(String),
    /// The scan ran but produced nothing; carries the sentinel text
    Nothing(String),
}

impl ConsolidatedText {
    /// Text to report, never empty
    pub fn as_str(&self) -> &str {
        match self {
            ConsolidatedText::Found(text) | ConsolidatedText::Nothing(text) => text,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ConsolidatedText::Found(_))
    }
}

/// Run the full consolidation chain over one pool
pub fn consolidate(pool: CandidatePool, options: &ConsolidateOptions) -> ConsolidatedText {
    let pool_size = pool.len();
    let ordered = reading_order(pool.into_tokens());

    let cleaned = ordered
        .iter()
        .map(|token| clean(&token.text))
        .filter(|text| !text.is_empty())
        .filter(|text| options.is_relevant(text));

    let unique = dedup_case_insensitive(cleaned);
    debug!(
        "Consolidated {} pooled tokens into {} unique elements",
        pool_size,
        unique.len()
    );

    if unique.is_empty() {
        ConsolidatedText::Nothing(options.empty_sentinel.clone())
    } else {
        ConsolidatedText::Found(unique.join(options.mode.delimiter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_consolidation() {
        let pool: CandidatePool = vec![
            OcrOutput::Tokens(vec![
                Token::word("Pants", 120, 40, 88),
                Token::word("Himalaya", 10, 5, 93),
                Token::word("Baby", 60, 40, 91),
            ]),
            OcrOutput::Tokens(vec![
                Token::word("HIMALAYA,", 11, 5, 80),
                Token::word("XL", 10, 90, 77),
            ]),
        ]
        .into_iter()
        .collect();

        let text = consolidate(pool, &ConsolidateOptions::default());
        assert_eq!(text, ConsolidatedText::Found("Himalaya Baby Pants XL".to_string()));
    }

    #[test]
    fn test_flat_consolidation_uses_pipe() {
        let pool: CandidatePool = vec![
            OcrOutput::Text("Good Day\ncashew cookies".to_string()),
            OcrOutput::Text("good day cashew   cookies!".to_string()),
            OcrOutput::Text("Britannia".to_string()),
        ]
        .into_iter()
        .collect();
        let options = ConsolidateOptions::new(PipelineMode::Flat, Vec::<String>::new(), "none");

        let text = consolidate(pool, &options);
        assert_eq!(text.as_str(), "Good Day cashew cookies | Britannia");
    }

    #[test]
    fn test_relevance_filter_in_flat_mode() {
        let pool: CandidatePool = vec![
            OcrOutput::Text("Basmati RICE premium".to_string()),
            OcrOutput::Text("lorem ipsum".to_string()),
        ]
        .into_iter()
        .collect();
        let options = ConsolidateOptions::new(PipelineMode::Flat, [" Rice", "Lays"], "none");

        assert_eq!(consolidate(pool, &options).as_str(), "Basmati RICE premium");
    }

    #[test]
    fn test_relevance_ignored_in_positional_mode() {
        let pool: CandidatePool = vec![OcrOutput::Tokens(vec![Token::word("lorem", 0, 0, 99)])]
            .into_iter()
            .collect();
        let options = ConsolidateOptions::new(PipelineMode::Positional, ["rice"], "none");

        assert_eq!(consolidate(pool, &options).as_str(), "lorem");
    }

    #[test]
    fn test_empty_pool_yields_sentinel() {
        let pool: CandidatePool = vec![OcrOutput::Text(String::new()), OcrOutput::Tokens(vec![])]
            .into_iter()
            .collect();
        let text = consolidate(pool, &ConsolidateOptions::default());
        assert_eq!(text, ConsolidatedText::Nothing(DEFAULT_EMPTY_SENTINEL.to_string()));
        assert!(!text.as_str().is_empty());
    }

    #[test]
    fn test_noise_only_yields_sentinel() {
        let pool: CandidatePool = vec![OcrOutput::Tokens(vec![Token::word("~~", 0, 0, 99)])]
            .into_iter()
            .collect();
        assert!(!consolidate(pool, &ConsolidateOptions::default()).is_found());
    }
}
