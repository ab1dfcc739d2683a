//! Document extractor collaborator.
//!
//! Given raw file bytes, returns extracted text or fails with an
//! extraction error. The workflow depends only on the `DocumentExtract`
//! seam; `PdfTextExtractor` handles digital PDFs with embedded text
//! layers via the pdf-extract crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("document contains no extractable text")]
    EmptyDocument,
}

/// Trait for extracting text from uploaded document bytes.
pub trait DocumentExtract: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// PDF text extractor for digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl DocumentExtract for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::PdfParsing(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        Ok(text)
    }
}
