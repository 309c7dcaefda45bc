//! Rule-based field extractors for referral documents.

pub mod dates;
pub mod diagnosis;
pub mod labeled;
pub mod names;
pub mod patterns;
pub mod phone;
pub mod postal;

pub use dates::{extract_birth_date, BirthDateExtractor};
pub use diagnosis::{DiagnosisExtractor, DEFAULT_DIAGNOSIS};
pub use labeled::LabeledValueExtractor;
pub use names::{PersonNameExtractor, MOTHER_NAME_LABEL, PATIENT_NAME_LABEL};
pub use patterns::*;
pub use phone::{extract_phone, PhoneExtractor};
pub use postal::{extract_postal_code, PostalCodeExtractor};

use crate::document::Document;

/// Trait for field extractors.
///
/// Extractors never fail: a missing label, a missing document or a
/// candidate rejected by the validator all come back as `None`.
pub trait FieldExtractor {
    /// Extract the field from a document.
    fn extract(&self, document: &Document) -> Option<String>;

    /// Extract the field, `""` when nothing was found.
    fn extract_or_empty(&self, document: &Document) -> String {
        self.extract(document).unwrap_or_default()
    }
}
