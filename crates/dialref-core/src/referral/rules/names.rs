//! Person names printed above their caption.

use super::patterns::is_person_name;
use super::FieldExtractor;
use crate::document::{Document, SearchWindow};

/// Caption under the patient's name.
pub const PATIENT_NAME_LABEL: &str = "nome do paciente";

/// Caption under the mother's name ("Nome da Mãe", accent often mangled).
pub const MOTHER_NAME_LABEL: &str = "nome da m";

/// Upper-case name found in the three lines above a caption.
pub struct PersonNameExtractor {
    label: &'static str,
}

impl PersonNameExtractor {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    pub fn patient() -> Self {
        Self::new(PATIENT_NAME_LABEL)
    }

    pub fn mother() -> Self {
        Self::new(MOTHER_NAME_LABEL)
    }
}

impl FieldExtractor for PersonNameExtractor {
    fn extract(&self, document: &Document) -> Option<String> {
        let window = SearchWindow::backward(1..=3).with_validator(is_person_name);
        document
            .index()
            .find_near(self.label, &window)
            .map(str::to_string)
    }
}
