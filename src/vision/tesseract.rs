//! Tesseract OCR engine via command line
//!
//! Writes each variant to a temporary PNG and runs the `tesseract` binary on
//! it, requesting TSV output for word boxes or plain text otherwise.

use image::{GrayImage, ImageFormat};
use std::process::Command;
use std::time::Instant;
use tracing::debug;

use super::ocr::{EngineConfig, OcrEngine, OcrError, OutputKind};
use crate::consolidate::{OcrOutput, Token};

/// TSV row level for individual words
const WORD_LEVEL: &str = "5";

/// Tesseract command-line engine
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
    language: String,
}

impl TesseractCli {
    /// Create an engine using a specific binary
    pub fn with_binary(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    /// Check whether the binary can be executed
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run(&self, image: &GrayImage, config: &EngineConfig, kind: OutputKind) -> Result<String, OcrError> {
        let temp_file = tempfile::Builder::new()
            .prefix("product-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(temp_file.path(), ImageFormat::Png)?;

        let mut command = Command::new(&self.binary);
        command
            .arg(temp_file.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .args(config.args());
        if kind == OutputKind::Words {
            command.arg("tsv");
        }

        match command.output() {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::OcrFailed(format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::EngineNotAvailable(
                format!("{} not found (install tesseract-ocr)", self.binary),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(
        &self,
        image: &GrayImage,
        config: &EngineConfig,
        kind: OutputKind,
    ) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();
        let stdout = self.run(image, config, kind)?;

        let output = match kind {
            OutputKind::Words => OcrOutput::Tokens(parse_tsv(&stdout)?),
            OutputKind::Text => OcrOutput::Text(stdout),
        };
        debug!("tesseract {} finished in {:?}", config, start.elapsed());
        Ok(output)
    }
}

/// Parse Tesseract TSV output into word tokens
///
/// Columns are located through the header row. Rows that are not words or
/// carry no text are skipped; confidence is truncated to an integer.
pub fn parse_tsv(tsv: &str) -> Result<Vec<Token>, OcrError> {
    let mut lines = tsv.lines();
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };

    let columns: Vec<&str> = header.split('\t').collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| OcrError::OcrFailed(format!("TSV output missing '{}' column", name)))
    };
    let level_idx = column("level")?;
    let left_idx = column("left")?;
    let top_idx = column("top")?;
    let conf_idx = column("conf")?;
    let text_idx = column("text")?;

    let mut tokens = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < columns.len() || fields[level_idx] != WORD_LEVEL {
            continue;
        }

        let text = fields[text_idx].trim();
        if text.is_empty() {
            continue;
        }

        let parse_int = |idx: usize| -> Result<i32, OcrError> {
            fields[idx]
                .trim()
                .parse::<f32>()
                .map(|v| v as i32)
                .map_err(|_| OcrError::OcrFailed(format!("Bad TSV number: {:?}", fields[idx])))
        };

        tokens.push(Token::word(
            text,
            parse_int(left_idx)?,
            parse_int(top_idx)?,
            parse_int(conf_idx)?,
        ));
    }

    Ok(tokens)
}
