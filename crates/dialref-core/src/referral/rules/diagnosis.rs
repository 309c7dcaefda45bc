//! Diagnosis lookup against a configured vocabulary.

use super::FieldExtractor;
use crate::document::Document;

/// Reported when no clinical summary was uploaded.
pub const DEFAULT_DIAGNOSIS: &str = "DOENÇA RENAL CRÔNICA (DRC)";

/// Vocabulary entries found in the upper-cased clinical summary.
pub struct DiagnosisExtractor {
    vocabulary: Vec<String>,
    default_diagnosis: String,
}

impl DiagnosisExtractor {
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self {
            vocabulary,
            default_diagnosis: DEFAULT_DIAGNOSIS.to_string(),
        }
    }

    /// Replace the diagnosis used for a blank summary.
    pub fn with_default(mut self, diagnosis: impl Into<String>) -> Self {
        self.default_diagnosis = diagnosis.into();
        self
    }

    /// Vocabulary entries present in `document`, in vocabulary order.
    pub fn matches<'v>(&'v self, document: &Document) -> Vec<&'v str> {
        let haystack = document.text().to_uppercase();
        self.vocabulary
            .iter()
            .filter(|entry| !entry.is_empty() && haystack.contains(entry.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl FieldExtractor for DiagnosisExtractor {
    fn extract(&self, document: &Document) -> Option<String> {
        if document.is_blank() {
            return Some(self.default_diagnosis.clone());
        }
        Some(self.matches(document).join(", "))
    }
}
