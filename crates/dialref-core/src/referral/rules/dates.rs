//! Birth date extraction.

use super::patterns::{is_birth_date, DATE_ANYWHERE};
use super::FieldExtractor;
use crate::document::{Document, SearchWindow};

const BIRTH_DATE_LABEL: &str = "data nascimento";

/// Birth date printed above its caption, else the first date in the text.
pub struct BirthDateExtractor;

impl BirthDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BirthDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BirthDateExtractor {
    fn extract(&self, document: &Document) -> Option<String> {
        let window = SearchWindow::backward(1..=3).with_validator(is_birth_date);
        if let Some(date) = document.index().find_near(BIRTH_DATE_LABEL, &window) {
            return Some(date.to_string());
        }

        // Caption missing or misplaced: settle for any date in the document
        DATE_ANYWHERE
            .captures(&document.text())
            .map(|caps| caps[1].to_string())
    }
}

/// Extract the birth date from document text.
pub fn extract_birth_date(text: &str) -> Option<String> {
    BirthDateExtractor::new().extract(&Document::from_text(text))
}
