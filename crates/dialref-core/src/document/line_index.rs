//! Label lookups with a small look-ahead / look-behind window.

use std::ops::RangeInclusive;

use tracing::trace;

/// Predicate deciding whether a candidate line holds a plausible value.
pub type Validator = fn(&str) -> bool;

/// Which way to walk from the label line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Lines below the label.
    Forward,
    /// Lines above the label (values printed over their caption).
    Backward,
}

impl Direction {
    fn step(self, anchor: usize, offset: usize) -> Option<usize> {
        match self {
            Direction::Forward => anchor.checked_add(offset),
            Direction::Backward => anchor.checked_sub(offset),
        }
    }
}

/// Where to look for a value relative to its label line.
#[derive(Debug, Clone)]
pub struct SearchWindow {
    direction: Direction,
    offsets: RangeInclusive<usize>,
    validator: Option<Validator>,
}

impl SearchWindow {
    /// Look below the label, `offsets` lines away.
    pub fn forward(offsets: RangeInclusive<usize>) -> Self {
        Self {
            direction: Direction::Forward,
            offsets,
            validator: None,
        }
    }

    /// Look above the label, `offsets` lines away.
    pub fn backward(offsets: RangeInclusive<usize>) -> Self {
        Self {
            direction: Direction::Backward,
            offsets,
            validator: None,
        }
    }

    /// Only accept candidates matching `validator`.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    fn accepts(&self, candidate: &str) -> bool {
        match self.validator {
            Some(validator) => validator(candidate),
            None => is_label_free(candidate),
        }
    }
}

/// Non-empty and not itself a `label: value` line.
pub fn is_label_free(candidate: &str) -> bool {
    !candidate.is_empty() && !candidate.contains(':')
}

/// Read-only view over a document's lines.
#[derive(Debug, Clone, Copy)]
pub struct LineIndex<'a> {
    lines: &'a [String],
}

impl<'a> LineIndex<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines }
    }

    /// Position of the first line containing `label`, ignoring case.
    pub fn find_label(&self, label: &str) -> Option<usize> {
        let needle = label.to_lowercase();
        self.lines
            .iter()
            .position(|line| line.to_lowercase().contains(&needle))
    }

    /// First trimmed line inside `window` around the first `label` line
    /// that the window accepts.
    ///
    /// Later occurrences of the label are never examined.
    pub fn find_near(&self, label: &str, window: &SearchWindow) -> Option<&'a str> {
        let anchor = self.find_label(label)?;
        let found = self.scan(anchor, window);
        trace!(label, anchor, ?found, "window scan");
        found
    }

    /// Value for a `label: value` or label-then-value layout.
    ///
    /// Takes the next line when it is a bare value, otherwise whatever
    /// follows the last colon of the label line. A label line without a
    /// colon yields the whole line.
    pub fn labeled_value(&self, label: &str) -> Option<&'a str> {
        let anchor = self.find_label(label)?;
        if let Some(next) = self.scan(anchor, &SearchWindow::forward(1..=1)) {
            return Some(next);
        }
        self.lines[anchor].rsplit(':').next().map(str::trim)
    }

    fn scan(&self, anchor: usize, window: &SearchWindow) -> Option<&'a str> {
        window
            .offsets
            .clone()
            .filter_map(|offset| window.direction.step(anchor, offset))
            .filter_map(|i| self.lines.get(i))
            .map(|line| line.trim())
            .find(|candidate| window.accepts(candidate))
    }
}
