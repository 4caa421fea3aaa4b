//! # markscan-engine
//!
//! A single-pass markup scanner. Callers register short literal patterns,
//! each paired with a handler; scanning the input once produces the
//! (possibly rewritten) final text plus styled spans over that final text.
//!
//! ## Pipeline
//!
//! ```text
//! Source Text → Engine::process → per-char Attempt state machines → Handler
//!                                  (pending, reverse spawn order)    rewrites
//!                                                   ↓
//!                                   StyledText { text, spans }
//! ```
//!
//! ## Patterns
//!
//! A pattern is a literal where `?` places a checkpoint before the next
//! character. Between a checkpoint and the character after it, any run of
//! input may appear, so `*?*` matches `*bold*`. See [`pattern`].
//!
//! ## Module Structure
//!
//! ```text
//! markscan-engine/
//! ├── lib.rs      # This file - public API
//! ├── pattern.rs  # Pattern text parsing (checkpoints, errors)
//! ├── attempt.rs  # Attempt: one live match of one pattern
//! ├── engine.rs   # Engine, handlers, and the per-call scan
//! ├── rewrite.rs  # Offset translation across buffer rewrites
//! ├── span.rs     # StyledSpan / StyledText output
//! └── markup.rs   # Built-in markup rules (bold, italic, links...)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use markscan_engine::{Engine, Match, Outcome};
//!
//! let mut engine = Engine::new();
//! engine.register("*?*", false, |m: &Match<'_>| {
//!     let inner = m.matched.trim_matches('*').to_string();
//!     Outcome::styled(inner, "bold")
//! });
//!
//! let out = engine.process("hello *world*");
//! assert_eq!(out.text, "hello world");
//! assert_eq!(out.spans.len(), 1);
//! assert_eq!(out.slice(&out.spans[0]), "world");
//! ```
//!
//! Rendering spans into a styled, platform-specific string is left to the
//! caller; the engine only reports offsets, lengths and attributes.

pub mod attempt;
pub mod engine;
pub mod markup;
pub mod pattern;
pub mod rewrite;
pub mod span;

pub use engine::{Engine, Match, MatchHandler, Outcome, PatternSpec};
pub use markup::{Markup, MarkupRule, Style, Transform, default_rules, markup_engine};
pub use pattern::{Pattern, PatternChar, PatternError};
pub use span::{StyledSpan, StyledText};
