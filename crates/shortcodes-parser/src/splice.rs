//! Byte-range text splicing.

use std::ops::Range;

/// Collects byte-range replacements and applies them back to front.
///
/// Ranges refer to the original text; applying from the highest offset down
/// keeps every not-yet-applied range valid. Ranges must not overlap.
#[derive(Debug, Default)]
pub(crate) struct TextSplicer {
    edits: Vec<(Range<usize>, String)>,
}

impl TextSplicer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `range` of the original text with `replacement`.
    pub fn replace(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.edits.push((range, replacement.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits to `text`.
    ///
    /// Consumes the splicer to prevent accidental reuse.
    pub fn apply(mut self, text: &str) -> String {
        let mut out = text.to_owned();
        self.edits.sort_by_key(|(range, _)| range.start);
        for (range, replacement) in self.edits.into_iter().rev() {
            out.replace_range(range, &replacement);
        }
        out
    }
}
