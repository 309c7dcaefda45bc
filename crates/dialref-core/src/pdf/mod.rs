//! PDF processing module.
//!
//! Uploaded PDFs are staged on disk for the duration of text extraction and
//! turned into a [`Document`]. Layout analysis and OCR are not attempted: a
//! scanned page without a text layer yields an empty document.

mod extractor;
#[cfg(feature = "native")]
mod staging;

pub use extractor::PdfExtractor;
#[cfg(feature = "native")]
pub use staging::StagedUpload;

use tracing::debug;

use crate::document::Document;
use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Convert an uploaded PDF into a document.
///
/// The upload is written to a temporary file that is removed when this
/// function returns, whether extraction succeeded or not.
#[cfg(feature = "native")]
pub fn document_from_pdf(data: &[u8]) -> Result<Document> {
    let staged = StagedUpload::stage(data)?;
    let mut extractor = PdfExtractor::new();
    extractor.open(staged.path())?;
    to_document(&extractor)
}

/// Convert an uploaded PDF into a document.
#[cfg(not(feature = "native"))]
pub fn document_from_pdf(data: &[u8]) -> Result<Document> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;
    to_document(&extractor)
}

fn to_document(extractor: &impl PdfProcessor) -> Result<Document> {
    let text = extractor.extract_text()?;
    let document = Document::from_text(&text);
    if document.is_blank() {
        debug!(
            "PDF with {} pages has no text layer",
            extractor.page_count()
        );
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_a_parse_error() {
        let result = document_from_pdf(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_empty_upload_is_an_error() {
        assert!(document_from_pdf(&[]).is_err());
    }
}
