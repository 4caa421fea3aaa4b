use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A styled range of the final text.
///
/// Offsets count `char`s (Unicode scalar values), not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledSpan<A> {
    /// Inclusive start offset.
    pub start: usize,
    pub len: usize,
    pub attributes: A,
}

impl<A> StyledSpan<A> {
    pub fn new(start: usize, len: usize, attributes: A) -> Self {
        Self {
            start,
            len,
            attributes,
        }
    }

    /// Exclusive end offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.range().contains(&offset)
    }
}

/// Result of a scan: the final text and the spans styling it.
///
/// Spans are listed in the order their matches resolved, so an inner match
/// comes before the outer match that encloses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText<A> {
    pub text: String,
    pub spans: Vec<StyledSpan<A>>,
}

impl<A> StyledText<A> {
    /// Text with no styling at all.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn is_unstyled(&self) -> bool {
        self.spans.is_empty()
    }

    /// Length of the text in `char`s, the unit span offsets use.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The substring a span covers.
    pub fn slice(&self, span: &StyledSpan<A>) -> String {
        self.text.chars().skip(span.start).take(span.len).collect()
    }

    /// Spans covering the given offset, in resolution order.
    pub fn spans_at(&self, offset: usize) -> impl Iterator<Item = &StyledSpan<A>> {
        self.spans.iter().filter(move |s| s.contains(offset))
    }

    pub fn into_parts(self) -> (String, Vec<StyledSpan<A>>) {
        (self.text, self.spans)
    }
}
