//! Phone number extraction.

use super::patterns::PHONE;
use super::FieldExtractor;
use crate::document::Document;

/// First phone-shaped token in the document, as `AA-NNNNNNNN`.
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PhoneExtractor {
    fn extract(&self, document: &Document) -> Option<String> {
        extract_phone(&document.text())
    }
}

/// Extract the first phone number from text.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE
        .captures(text)
        .map(|caps| format!("{}-{}{}", &caps[1], &caps[2], &caps[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landline_with_area_code() {
        assert_eq!(
            extract_phone("Telefone: (11) 2345-6789"),
            Some("11-23456789".to_string())
        );
    }

    #[test]
    fn test_mobile_number() {
        assert_eq!(
            extract_phone("Cel 11 98765-4321 / 11 2345-6789"),
            Some("11-987654321".to_string())
        );
    }

    #[test]
    fn test_no_phone() {
        assert_eq!(extract_phone("Telefone: não informado"), None);
        assert_eq!(PhoneExtractor::new().extract_or_empty(&Document::empty()), "");
    }
}
