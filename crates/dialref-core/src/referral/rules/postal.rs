//! CEP (Brazilian postal code) extraction.

use super::patterns::{has_postal_code, postal_code_in};
use super::FieldExtractor;
use crate::document::{Document, SearchWindow};

const POSTAL_CODE_LABEL: &str = "cep";

/// CEP printed up to four lines above its caption, as `NNNNN-NNN`.
pub struct PostalCodeExtractor;

impl PostalCodeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostalCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PostalCodeExtractor {
    fn extract(&self, document: &Document) -> Option<String> {
        let window = SearchWindow::backward(1..=4).with_validator(has_postal_code);
        document
            .index()
            .find_near(POSTAL_CODE_LABEL, &window)
            .and_then(postal_code_in)
    }
}

/// Extract the CEP from document text.
pub fn extract_postal_code(text: &str) -> Option<String> {
    PostalCodeExtractor::new().extract(&Document::from_text(text))
}
