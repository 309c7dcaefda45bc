//! Error types for the dialref-core library.

use thiserror::Error;

/// Main error type for the dialref library.
#[derive(Error, Debug)]
pub enum DialrefError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Geocoding error.
    #[error("geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Unknown-value provider error.
    #[error("value provider error: {0}")]
    Provider(#[from] ProviderError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Staging the upload on disk failed.
    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a geocoding backend.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Transport-level failure (connection, timeout, TLS).
    #[cfg(feature = "native")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with something we could not read.
    #[error("unexpected geocoder response: {message}")]
    Parse { message: String },

    /// The service asked us to slow down.
    #[error("geocoder rate limit exceeded")]
    RateLimited,
}

/// Errors raised by a clinical value provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider refuses to invent a value; it must be typed in by hand.
    #[error("{0} must be entered manually")]
    ManualEntryRequired(&'static str),
}

/// Result type for the dialref library.
pub type Result<T> = std::result::Result<T, DialrefError>;
