//! Core library for dialysis referral form extraction.
//!
//! This crate provides:
//! - PDF text extraction with scoped staging of uploads
//! - Label-anchored field extraction over document lines
//! - Postal code to health district resolution via a pluggable geocoder
//! - Providers for clinical values the documents do not carry
//! - The referral form schema and its assembler

pub mod clinical;
pub mod document;
pub mod error;
pub mod geo;
pub mod models;
pub mod pdf;
pub mod referral;

pub use clinical::{ClinicalValue, ClinicalValueProvider, ValueSource};
pub use document::Document;
pub use error::{DialrefError, Result};
pub use geo::{DisabledGeocoder, DistrictAssignment, GeoResolver, Geocoder, NOT_FOUND};
#[cfg(feature = "native")]
pub use geo::NominatimGeocoder;
pub use models::config::DialrefConfig;
pub use models::form::{FormRecord, FORM_SCHEMA};
pub use pdf::{document_from_pdf, PdfExtractor, PdfProcessor};
pub use referral::{AssemblyReport, FormAssembler, ReferralDocuments, Uploads};
