//! Plain `label: value` fields (CPF, sex, CNS, address).

use super::FieldExtractor;
use crate::document::Document;

/// Value next to, or right below, a label.
pub struct LabeledValueExtractor {
    label: String,
}

impl LabeledValueExtractor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl FieldExtractor for LabeledValueExtractor {
    fn extract(&self, document: &Document) -> Option<String> {
        document
            .index()
            .labeled_value(&self.label)
            .map(str::to_string)
    }
}
