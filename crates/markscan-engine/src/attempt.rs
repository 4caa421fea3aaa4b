//! # Attempts
//!
//! An [`Attempt`] is one live try at matching a [`Pattern`] that started at
//! a given offset of the working text. The engine feeds it one input
//! character at a time through [`Attempt::step`].
//!
//! ## States
//!
//! ```text
//!            expected char             last char
//! Building ───────────────▶ Building ───────────▶ Complete
//!    │  ▲                       │
//!    │  └──── recursive ────────┤ mismatch after a checkpoint
//!    │        rewind            ▼
//!    └─ mismatch before ──▶   Dead
//!       any checkpoint
//! ```
//!
//! While the cursor sits exactly on its checkpoint a mismatching character
//! is absorbed ([`Step::Waiting`]); that is what lets `*?*` span any text.

use crate::pattern::Pattern;

/// Identifier assigned when an attempt is spawned, unique within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(pub u64);

/// What happened when an attempt was fed a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The character matched and the pattern is not finished yet.
    Advanced,
    /// The character matched the last pattern character.
    Complete,
    /// Mismatch absorbed while sitting on a checkpoint.
    Waiting,
    /// Mismatch after a checkpoint; a recursive attempt went back to it.
    Rewound,
    /// The attempt can no longer match and must be discarded.
    Dead,
}

#[derive(Debug, Clone)]
pub struct Attempt<'p> {
    id: AttemptId,
    pattern: &'p Pattern,
    recursive: bool,
    /// Index of the registered pattern this attempt belongs to.
    spec: usize,
    start: usize,
    cursor: usize,
    must_fulfill: bool,
    /// Zero means no rewind is available.
    rewind_point: usize,
    /// Set once the attempt completed or died; swept by the scan.
    retired: bool,
}

impl<'p> Attempt<'p> {
    /// Creates an attempt whose trigger character sits at `start`.
    ///
    /// The trigger has not been consumed yet; call [`Attempt::advance`] once
    /// to account for it.
    pub fn new(
        id: AttemptId,
        pattern: &'p Pattern,
        recursive: bool,
        spec: usize,
        start: usize,
    ) -> Self {
        Self {
            id,
            pattern,
            recursive,
            spec,
            start,
            cursor: 0,
            must_fulfill: true,
            rewind_point: 0,
            retired: false,
        }
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn spec(&self) -> usize {
        self.spec
    }

    pub fn pattern(&self) -> &'p Pattern {
        self.pattern
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Moves the start offset after the working text was rewritten.
    pub fn relocate(&mut self, start: usize) {
        self.start = start;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn must_fulfill(&self) -> bool {
        self.must_fulfill
    }

    pub fn rewind_point(&self) -> usize {
        self.rewind_point
    }

    pub fn retire(&mut self) {
        self.retired = true;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// The character the next input character must equal to advance.
    pub fn expected(&self) -> Option<char> {
        self.pattern.get(self.cursor).map(|c| c.ch)
    }

    pub fn expects(&self, ch: char) -> bool {
        self.expected() == Some(ch)
    }

    /// Consumes the expected character. Returns true once the whole
    /// pattern has been consumed.
    pub fn advance(&mut self) -> bool {
        self.cursor += 1;
        match self.pattern.get(self.cursor) {
            None => true,
            Some(next) => {
                if next.checkpoint {
                    self.must_fulfill = false;
                    self.rewind_point = self.cursor;
                }
                false
            }
        }
    }

    /// Returns to the last checkpoint if progress was made past it.
    pub fn rewind(&mut self) -> bool {
        if self.rewind_point > 0 && self.cursor > self.rewind_point {
            self.cursor = self.rewind_point;
            true
        } else {
            false
        }
    }

    /// Feeds one input character.
    pub fn step(&mut self, ch: char) -> Step {
        if self.expects(ch) {
            return if self.advance() {
                Step::Complete
            } else {
                Step::Advanced
            };
        }
        if self.must_fulfill {
            return Step::Dead;
        }
        if !self.rewind() {
            return Step::Waiting;
        }
        if self.recursive {
            Step::Rewound
        } else {
            Step::Dead
        }
    }
}
