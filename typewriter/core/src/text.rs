//! Grapheme-Aware Term Text
//!
//! Typing and erasing move one user-perceived character per tick. A
//! "character" here is an extended grapheme cluster, so combining marks,
//! emoji sequences and non-Latin scripts are revealed as a whole.

use unicode_segmentation::UnicodeSegmentation;

/// A term pre-split into grapheme boundaries
///
/// Holds the byte offset at the end of every grapheme so that any prefix
/// can be sliced in O(1) on each tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermText {
    text: String,
    /// `boundaries[i]` is the byte length of the first `i + 1` graphemes
    boundaries: Vec<usize>,
}

impl TermText {
    /// Split a term into graphemes
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let boundaries = text
            .grapheme_indices(true)
            .map(|(offset, grapheme)| offset + grapheme.len())
            .collect();
        Self { text, boundaries }
    }

    /// Number of graphemes in the term
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether the term has nothing to type
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// The first `count` graphemes (clamped to the term length)
    #[must_use]
    pub fn prefix(&self, count: usize) -> &str {
        match count.min(self.len()) {
            0 => "",
            n => &self.text[..self.boundaries[n - 1]],
        }
    }

    /// The full term
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<&str> for TermText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TermText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
