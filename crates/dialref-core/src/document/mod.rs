//! Line-oriented documents produced by PDF text extraction.

mod line_index;

pub use line_index::{is_label_free, LineIndex, SearchWindow, Validator};

/// Text of one uploaded document, split into lines.
///
/// A document is immutable once built. A missing upload is represented by
/// [`Document::empty`], never by an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// The document of an absent upload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split extracted text into lines.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Lines in reading order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full text, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// True when the document holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Label lookups over this document.
    pub fn index(&self) -> LineIndex<'_> {
        LineIndex::new(&self.lines)
    }
}
