//! # Rewrites
//!
//! A styled match replaces `[start, start + old_len)` of the working text
//! with its replacement. Offsets recorded before that moment (spans already
//! collected, attempts still pending) have to be translated into the new
//! text.
//!
//! ```text
//! before:  *a _b_ c*      inner span "b" at 4..5
//! after:   a b c          window: "a b c" found at 1 inside "*a b c*"
//!                         inner span "b" at 2..3
//! ```
//!
//! Offsets before the range are untouched, offsets after it shift by the
//! length delta. Offsets inside it are mapped through the window where the
//! replacement occurs in the matched text, and clamped to the replacement.
//! The window is looked up at the pattern's leading delimiter width first,
//! so `-----` stripped to `-` maps through offset 2, not 0.

/// Offset translation for one rewrite of the working text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrite {
    start: usize,
    old_len: usize,
    new_len: usize,
    /// Position of the replacement inside the replaced text, if it occurs.
    window: Option<usize>,
}

impl Rewrite {
    /// `preferred` is where the replacement is expected inside `replaced`
    /// (the leading delimiter width); any other occurrence is a fallback.
    pub fn new(start: usize, replaced: &[char], replacement: &[char], preferred: usize) -> Self {
        Self {
            start,
            old_len: replaced.len(),
            new_len: replacement.len(),
            window: find_window(replaced, replacement, preferred),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Signed change in text length.
    pub fn delta(&self) -> isize {
        self.new_len as isize - self.old_len as isize
    }

    /// Translates an offset of the old text into the new text.
    pub fn map(&self, pos: usize) -> usize {
        if pos < self.start {
            return pos;
        }
        let rel = pos - self.start;
        if rel >= self.old_len {
            return pos - self.old_len + self.new_len;
        }
        let shifted = match self.window {
            Some(w) => rel.saturating_sub(w),
            None => rel,
        };
        self.start + shifted.min(self.new_len)
    }

    /// Translates the offset of a single character, or `None` if the
    /// rewrite removed that character.
    pub fn map_char(&self, pos: usize) -> Option<usize> {
        if pos < self.start {
            return Some(pos);
        }
        let rel = pos - self.start;
        if rel >= self.old_len {
            return Some(pos - self.old_len + self.new_len);
        }
        let w = self.window?;
        (rel >= w && rel < w + self.new_len).then(|| self.start + rel - w)
    }

    /// Translates a `(start, len)` range, returning the new `(start, len)`.
    pub fn map_range(&self, start: usize, len: usize) -> (usize, usize) {
        let new_start = self.map(start);
        let new_end = self.map(start + len);
        (new_start, new_end.saturating_sub(new_start))
    }
}

fn find_window(haystack: &[char], needle: &[char], preferred: usize) -> Option<usize> {
    if haystack.get(preferred..preferred + needle.len()) == Some(needle) {
        return Some(preferred);
    }
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
