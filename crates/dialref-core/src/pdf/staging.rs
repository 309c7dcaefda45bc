//! Scoped on-disk staging of uploaded PDFs.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::trace;

use crate::error::PdfError;

/// An upload written to a temporary file.
///
/// The file is deleted when the value is dropped, on every exit path.
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `data` to a fresh `dialref-*.pdf` temporary file.
    pub fn stage(data: &[u8]) -> Result<Self, PdfError> {
        let mut file = tempfile::Builder::new()
            .prefix("dialref-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        trace!("Staged {} bytes at {}", data.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
