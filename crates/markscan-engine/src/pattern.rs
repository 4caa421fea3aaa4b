//! # Pattern Text
//!
//! A pattern is written as a short literal. A `?` places a *checkpoint* on
//! the character that follows it:
//!
//! ```text
//! "*?*"     → '*' , checkpoint '*'
//! "--?--"   → '-' , '-' , checkpoint '-' , '-'
//! "[?](?)"  → '[' , checkpoint ']' , '(' , checkpoint ')'
//! ```
//!
//! Characters before the first checkpoint must follow the trigger character
//! immediately. Once a checkpoint is reached, any run of input may appear
//! before the checkpointed character, and a later mismatch rewinds the
//! attempt back to the checkpoint (see [`crate::attempt`]).
//!
//! `??` is a literal `?` carrying a checkpoint. A trailing `?` with nothing
//! after it is dropped. A checkpoint on the first character is ignored
//! because the first character is what spawns an attempt.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern text is empty")]
    Empty,
}

/// One character of a parsed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternChar {
    pub ch: char,
    /// True when the source text had a `?` directly before this character.
    pub checkpoint: bool,
}

/// An immutable, parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    chars: Vec<PatternChar>,
}

impl Pattern {
    /// Marker that places a checkpoint on the next character.
    pub const OPTIONAL: char = '?';

    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut chars: Vec<PatternChar> = Vec::with_capacity(source.len());
        let mut it = source.chars();

        while let Some(c) = it.next() {
            if c == Self::OPTIONAL {
                let Some(next) = it.next() else {
                    break;
                };
                chars.push(PatternChar {
                    ch: next,
                    checkpoint: !chars.is_empty(),
                });
            } else {
                chars.push(PatternChar {
                    ch: c,
                    checkpoint: false,
                });
            }
        }

        if chars.is_empty() {
            return Err(PatternError::Empty);
        }

        Ok(Self {
            source: source.to_string(),
            chars,
        })
    }

    /// The text the pattern was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The trigger character; seeing it in the input spawns an attempt.
    pub fn first(&self) -> char {
        self.chars[0].ch
    }

    pub fn get(&self, index: usize) -> Option<PatternChar> {
        self.chars.get(index).copied()
    }

    pub fn chars(&self) -> &[PatternChar] {
        &self.chars
    }

    /// Number of pattern characters (markers excluded).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; empty patterns are rejected by [`Pattern::parse`].
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn has_checkpoint(&self) -> bool {
        self.chars.iter().any(|c| c.checkpoint)
    }

    /// Characters before the first checkpoint (the whole pattern if none).
    pub fn leading_len(&self) -> usize {
        self.chars
            .iter()
            .position(|c| c.checkpoint)
            .unwrap_or(self.chars.len())
    }

    /// Characters from the last checkpoint to the end (zero if none).
    pub fn trailing_len(&self) -> usize {
        self.chars
            .iter()
            .rposition(|c| c.checkpoint)
            .map_or(0, |i| self.chars.len() - i)
    }
}
