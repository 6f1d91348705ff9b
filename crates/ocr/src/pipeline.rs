use std::path::Path;
use thiserror::Error;

use crate::assemble::{ReceiptAssembler, ReceiptDocument};
use crate::cluster::LineClusterer;
use crate::config::PipelineConfig;
use crate::extract::{Extraction, ProductExtractor};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::Token;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of a single receipt processing run.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Reconstructed lines, top to bottom.
    pub lines: Vec<String>,
    /// Every record the extractor produced, plus the skipped lines.
    pub extraction: Extraction,
    /// The filtered document built from `extraction.records`.
    pub document: ReceiptDocument,
}

impl ScanResult {
    /// Nothing on the receipt looked like a product. Not an error.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// Orchestrates: OCR → cluster → extract → assemble.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    clusterer: LineClusterer,
    extractor: ProductExtractor,
    assembler: ReceiptAssembler,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, config: &PipelineConfig) -> Self {
        Self {
            recognizer,
            clusterer: config.clusterer(),
            extractor: config.extractor(),
            assembler: ReceiptAssembler::new(config.currency.clone()),
        }
    }

    /// Process an image on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw image bytes. A service error aborts the run.
    pub fn process_bytes(&self, image_bytes: &[u8]) -> Result<ScanResult, PipelineError> {
        let tokens = self.recognizer.recognize(image_bytes)?;
        Ok(self.process_tokens(tokens))
    }

    /// Run the structuring steps over word tokens. Pure; never fails.
    pub fn process_tokens(&self, tokens: Vec<Token>) -> ScanResult {
        let token_count = tokens.len();
        let lines = self.clusterer.cluster(tokens);
        let extraction = self.extractor.extract_lines(&lines);
        let document = self.assembler.assemble(&extraction.records);

        tracing::info!(
            tokens = token_count,
            lines = lines.len(),
            records = extraction.records.len(),
            products = document.total_items(),
            "receipt processed"
        );

        ScanResult {
            lines: lines.iter().map(|l| l.text()).collect(),
            extraction,
            document,
        }
    }
}
