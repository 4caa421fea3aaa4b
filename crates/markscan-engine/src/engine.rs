//! # Engine
//!
//! The [`Engine`] owns the registered patterns. Each call to
//! [`Engine::process`] builds a fresh `ScanState` and walks the source once,
//! left to right.
//!
//! ## Per-character step
//!
//! 1. Pending attempts are visited newest first, so an attempt nested inside
//!    an older one gets the first chance at the character.
//! 2. An attempt that completes calls its handler. A styled outcome rewrites
//!    the working text in place and marks the character as consumed; no
//!    other attempt may then advance on it.
//! 3. If no attempt completed on the character, every pattern whose first
//!    character equals it spawns a new attempt, in registration order.
//!
//! ## Working text
//!
//! Attempts match against the working text, which is rewritten mid-scan.
//! Everything after the current position is still the untouched source, so
//! the position of the next source character is always known: `pos + 1`, or
//! the end of the replacement after a rewrite. Offsets recorded earlier are
//! translated through a [`Rewrite`].
//!
//! When two different patterns could both start or both complete on the same
//! character, the winner is decided by registration order and by the newest
//! first walk above. That ordering is an artifact of the scan, not a
//! precedence policy.

use crate::{
    attempt::{Attempt, AttemptId, Step},
    pattern::{Pattern, PatternError},
    rewrite::Rewrite,
    span::{StyledSpan, StyledText},
};

/// What a handler is told about a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// The raw matched text, delimiters included.
    pub matched: &'a str,
    /// The whole working text at the moment of the match.
    pub text: &'a str,
    /// Offset of `matched` inside `text`, in chars.
    pub start: usize,
}

/// A handler's decision for a completed match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<A> {
    /// Replace the matched text and tag the replacement.
    Styled { replacement: String, attributes: A },
    /// The match is consumed but the text is neither rewritten nor tagged.
    Unstyled,
}

impl<A> Outcome<A> {
    pub fn styled(replacement: impl Into<String>, attributes: A) -> Self {
        Self::Styled {
            replacement: replacement.into(),
            attributes,
        }
    }

    pub fn unstyled() -> Self {
        Self::Unstyled
    }
}

/// Called when an attempt matches its whole pattern.
///
/// Handlers only inspect the text; they never touch scan state.
pub trait MatchHandler<A> {
    fn on_match(&self, m: &Match<'_>) -> Outcome<A>;
}

impl<A, F> MatchHandler<A> for F
where
    F: Fn(&Match<'_>) -> Outcome<A>,
{
    fn on_match(&self, m: &Match<'_>) -> Outcome<A> {
        self(m)
    }
}

/// A registered pattern with its handler.
pub struct PatternSpec<A> {
    pattern: Pattern,
    recursive: bool,
    handler: Box<dyn MatchHandler<A>>,
}

impl<A> PatternSpec<A> {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Recursive patterns survive any number of rewinds.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

impl<A> std::fmt::Debug for PatternSpec<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternSpec")
            .field("pattern", &self.pattern.source())
            .field("recursive", &self.recursive)
            .finish_non_exhaustive()
    }
}

/// The markup scanner. `A` is the attribute type handlers tag spans with.
pub struct Engine<A> {
    patterns: Vec<PatternSpec<A>>,
}

impl<A> Default for Engine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for Engine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("patterns", &self.patterns)
            .finish()
    }
}

impl<A> Engine<A> {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Registers a pattern. Invalid pattern text is ignored.
    pub fn register<H>(&mut self, pattern: &str, recursive: bool, handler: H)
    where
        H: MatchHandler<A> + 'static,
    {
        if let Err(err) = self.try_register(pattern, recursive, handler) {
            log::debug!("ignoring pattern {pattern:?}: {err}");
        }
    }

    /// Registers a pattern, reporting invalid pattern text.
    pub fn try_register<H>(
        &mut self,
        pattern: &str,
        recursive: bool,
        handler: H,
    ) -> Result<(), PatternError>
    where
        H: MatchHandler<A> + 'static,
    {
        let pattern = Pattern::parse(pattern)?;
        self.register_pattern(pattern, recursive, handler);
        Ok(())
    }

    /// Registers an already parsed pattern.
    pub fn register_pattern<H>(&mut self, pattern: Pattern, recursive: bool, handler: H)
    where
        H: MatchHandler<A> + 'static,
    {
        self.patterns.push(PatternSpec {
            pattern,
            recursive,
            handler: Box::new(handler),
        });
    }

    pub fn patterns(&self) -> &[PatternSpec<A>] {
        &self.patterns
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Scans `source` once and returns the final text with its spans.
    pub fn process(&self, source: &str) -> StyledText<A> {
        if self.patterns.is_empty() {
            return StyledText::plain(source);
        }
        let mut scan = ScanState::new(&self.patterns, source);
        let mut pos = 0;
        for ch in source.chars() {
            pos = scan.feed(ch, pos);
        }
        scan.finish()
    }
}

/// A match that resolved with attributes.
struct Resolved<A> {
    start: usize,
    len: usize,
    attributes: A,
}

/// Everything one `process` call mutates. Never outlives the call.
struct ScanState<'e, A> {
    patterns: &'e [PatternSpec<A>],
    buffer: Vec<char>,
    pending: Vec<Attempt<'e>>,
    collected: Vec<Resolved<A>>,
    next_id: u64,
}

impl<'e, A> ScanState<'e, A> {
    fn new(patterns: &'e [PatternSpec<A>], source: &str) -> Self {
        Self {
            patterns,
            buffer: source.chars().collect(),
            pending: Vec::new(),
            collected: Vec::new(),
            next_id: 0,
        }
    }

    fn alloc_id(&mut self) -> AttemptId {
        let id = AttemptId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Drops attempts that completed, died or lost their trigger.
    fn sweep(&mut self) {
        self.pending.retain(|a| !a.is_retired());
    }

    /// Feeds the source character sitting at `pos` of the working text and
    /// returns where the next source character sits.
    fn feed(&mut self, ch: char, pos: usize) -> usize {
        debug_assert_eq!(self.buffer.get(pos), Some(&ch));

        let mut next = pos + 1;
        let mut completed = false;
        let mut rewritten = false;

        // Newest first. The walk never removes entries; attempts are only
        // retired here and swept once the character is done.
        for i in (0..self.pending.len()).rev() {
            let attempt = &mut self.pending[i];
            if attempt.is_retired() || (rewritten && attempt.expects(ch)) {
                continue;
            }
            let id = attempt.id();
            match attempt.step(ch) {
                Step::Advanced | Step::Waiting => {}
                Step::Rewound => {
                    log::trace!(
                        "attempt {id:?} rewound to {} at {pos}",
                        attempt.rewind_point()
                    );
                }
                Step::Dead => {
                    log::trace!(
                        "attempt {id:?} discarded at {pos}, prefix unmet: {}",
                        attempt.must_fulfill()
                    );
                    attempt.retire();
                }
                Step::Complete => {
                    attempt.retire();
                    let (spec, start) = (attempt.spec(), attempt.start());
                    completed = true;
                    if let Some(after) = self.resolve(id, spec, start, pos) {
                        next = after;
                        rewritten = true;
                    }
                }
            }
        }

        if !completed {
            next = self.spawn(ch, pos).unwrap_or(next);
        }
        self.sweep();
        next
    }

    /// Spawns attempts for every pattern triggered by `ch`. A single
    /// character pattern completes right away and stops further spawning;
    /// if it rewrote the text, the new position of the next character is
    /// returned.
    fn spawn(&mut self, ch: char, pos: usize) -> Option<usize> {
        let patterns = self.patterns;
        for (index, spec) in patterns.iter().enumerate() {
            if spec.pattern.first() != ch {
                continue;
            }
            let id = self.alloc_id();
            let mut attempt = Attempt::new(id, &spec.pattern, spec.recursive, index, pos);
            if attempt.advance() {
                return self.resolve(id, index, pos, pos);
            }
            log::trace!(
                "attempt {id:?} for {:?} spawned at {pos}",
                spec.pattern.source()
            );
            self.pending.push(attempt);
        }
        None
    }

    /// Runs the handler for a completed attempt covering `start..=end`.
    /// Returns where the next source character sits if the text was
    /// rewritten.
    fn resolve(
        &mut self,
        id: AttemptId,
        spec: usize,
        start: usize,
        end: usize,
    ) -> Option<usize> {
        let spec = &self.patterns[spec];
        let matched: String = self.buffer[start..=end].iter().collect();
        let text: String = self.buffer.iter().collect();

        let outcome = spec.handler.on_match(&Match {
            matched: &matched,
            text: &text,
            start,
        });

        let (replacement, attributes) = match outcome {
            Outcome::Unstyled => {
                log::trace!("attempt {id:?} matched {matched:?} without styling");
                return None;
            }
            Outcome::Styled {
                replacement,
                attributes,
            } => (replacement, attributes),
        };

        let replacement: Vec<char> = replacement.chars().collect();
        let rewrite = Rewrite::new(
            start,
            &self.buffer[start..=end],
            &replacement,
            spec.pattern.leading_len(),
        );
        let len = replacement.len();
        self.buffer.splice(start..=end, replacement);

        for r in &mut self.collected {
            (r.start, r.len) = rewrite.map_range(r.start, r.len);
        }
        // Attempts whose trigger character was rewritten away are stale.
        for a in self.pending.iter_mut().filter(|a| !a.is_retired()) {
            match rewrite.map_char(a.start()) {
                Some(start) => a.relocate(start),
                None => {
                    log::trace!("attempt {:?} lost its trigger to {id:?}", a.id());
                    a.retire();
                }
            }
        }

        log::trace!(
            "attempt {id:?} resolved {matched:?} at {start}, delta {}",
            rewrite.delta()
        );
        self.collected.push(Resolved {
            start,
            len,
            attributes,
        });
        Some(start + len)
    }

    fn finish(self) -> StyledText<A> {
        StyledText {
            text: self.buffer.into_iter().collect(),
            spans: self
                .collected
                .into_iter()
                .map(|r| StyledSpan::new(r.start, r.len, r.attributes))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::{cell::RefCell, rc::Rc};

    /// Strips `n` chars from each side of the match.
    fn strip<A: Clone + 'static>(
        n: usize,
        attributes: A,
    ) -> impl Fn(&Match<'_>) -> Outcome<A> {
        move |m: &Match<'_>| {
            let chars: Vec<char> = m.matched.chars().collect();
            let inner: String = chars[n..chars.len() - n].iter().collect();
            Outcome::styled(inner, attributes.clone())
        }
    }

    fn spans<A: Clone>(out: &StyledText<A>) -> Vec<(usize, usize, A)> {
        out.spans
            .iter()
            .map(|s| (s.start, s.len, s.attributes.clone()))
            .collect()
    }

    #[rstest]
    #[case("")]
    #[case("hello")]
    #[case("*unclosed _ [ ] ( )")]
    #[case("héllo ✓ wörld")]
    fn no_patterns_is_identity(#[case] input: &str) {
        let engine: Engine<()> = Engine::new();
        let out = engine.process(input);
        assert_eq!(out.text, input);
        assert!(out.spans.is_empty());
    }

    #[test]
    fn input_without_triggers_is_untouched() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, "bold"));
        let out = engine.process("plain words only");
        assert_eq!(out, StyledText::plain("plain words only"));
    }

    #[test]
    fn empty_patterns_are_ignored() {
        let mut engine: Engine<()> = Engine::new();
        engine.register("", false, |_: &Match<'_>| Outcome::unstyled());
        engine.register("?", true, |_: &Match<'_>| Outcome::unstyled());
        assert_eq!(engine.pattern_count(), 0);
        assert_eq!(
            engine.try_register("", false, |_: &Match<'_>| Outcome::unstyled()),
            Err(PatternError::Empty)
        );
    }

    #[test]
    fn simple_wrap() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, "bold"));
        let out = engine.process("hello *world*");
        assert_eq!(out.text, "hello world");
        assert_eq!(spans(&out), vec![(6, 5, "bold")]);
        assert_eq!(out.slice(&out.spans[0]), "world");
    }

    #[test]
    fn later_matches_use_rewritten_offsets() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, "bold"));
        let out = engine.process("*a* and *bc* then *d*");
        assert_eq!(out.text, "a and bc then d");
        assert_eq!(
            spans(&out),
            vec![(0, 1, "bold"), (6, 2, "bold"), (14, 1, "bold")]
        );
    }

    #[test]
    fn handler_sees_current_text() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = Engine::new();
        engine.register("*?*", false, move |m: &Match<'_>| {
            sink.borrow_mut()
                .push((m.matched.to_string(), m.text.to_string(), m.start));
            Outcome::styled(m.matched.trim_matches('*'), ())
        });

        engine.process("*a* *b*");

        assert_eq!(
            *seen.borrow(),
            vec![
                ("*a*".to_string(), "*a* *b*".to_string(), 0),
                ("*b*".to_string(), "a *b*".to_string(), 2),
            ]
        );
    }

    #[test]
    fn growing_replacement() {
        let mut engine = Engine::new();
        engine.register("@", false, |_: &Match<'_>| Outcome::styled("at", 'a'));
        engine.register("*?*", false, strip(1, 'b'));
        let out = engine.process("x@y *z*");
        assert_eq!(out.text, "xaty z");
        assert_eq!(spans(&out), vec![(1, 2, 'a'), (5, 1, 'b')]);
    }

    #[test]
    fn unstyled_match_is_consumed_silently() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut engine: Engine<()> = Engine::new();
        engine.register("@?@", false, move |_: &Match<'_>| {
            *counter.borrow_mut() += 1;
            Outcome::unstyled()
        });

        let out = engine.process("@a@b@");

        // The closing `@` at 2 is consumed and does not start a new attempt.
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(out.text, "@a@b@");
        assert!(out.spans.is_empty());
    }

    #[rstest]
    #[case("--a--", "a", vec![(0, 1)])]
    #[case("x --long text-- y", "x long text y", vec![(2, 9)])]
    #[case("--a-b--", "--a-b--", vec![])]
    #[case("----", "", vec![(0, 0)])]
    #[case("x ---- y", "x  y", vec![(2, 0)])]
    fn non_recursive_optional(
        #[case] input: &str,
        #[case] text: &str,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        let mut engine = Engine::new();
        engine.register("--?--", false, strip(2, ()));
        let out = engine.process(input);
        assert_eq!(out.text, text);
        let got: Vec<(usize, usize)> = out.spans.iter().map(|s| (s.start, s.len)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn recursive_optional_survives_rewind() {
        let mut engine = Engine::new();
        engine.register("--?--", true, strip(2, ()));
        let out = engine.process("--a-b--");
        assert_eq!(out.text, "a-b");
        assert_eq!(spans(&out), vec![(0, 3, ())]);
    }

    #[test]
    fn nested_recursive_resolves_inner_first() {
        let mut engine = Engine::new();
        engine.register("[?](?)", true, |m: &Match<'_>| {
            let inner = &m.matched[1..m.matched.len() - 1];
            match inner.split_once("](") {
                Some((label, url)) => Outcome::styled(label, url.to_string()),
                None => Outcome::unstyled(),
            }
        });

        let out = engine.process("[a [b](x) c](y)");

        assert_eq!(out.text, "a b c");
        assert_eq!(
            spans(&out),
            vec![(2, 1, "x".to_string()), (0, 5, "y".to_string())]
        );
        assert_eq!(out.slice(&out.spans[0]), "b");
    }

    #[test]
    fn identical_attempts_count_once() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, "first"));
        engine.register("*?*", false, strip(1, "second"));
        let out = engine.process("*a*");
        assert_eq!(out.text, "a");
        // Newest attempt wins; the older one may not reuse the closing `*`.
        assert_eq!(spans(&out), vec![(0, 1, "second")]);
    }

    #[test]
    fn attempts_on_stripped_delimiters_are_dropped() {
        let mut engine = Engine::new();
        engine.register("--?--", false, strip(2, ()));
        let out = engine.process("--a-- x --b--");
        assert_eq!(out.text, "a x b");
        assert_eq!(spans(&out), vec![(0, 1, ()), (4, 1, ())]);
    }

    #[test]
    fn pending_attempt_inside_rewrite_is_relocated() {
        let mut engine = Engine::new();
        engine.register("_?_", false, strip(1, 'i'));
        engine.register("*?*", false, strip(1, 'b'));
        let out = engine.process("_a *b_ c*");
        // `_` closes first and strips its delimiters; the bold attempt now
        // starts inside the rewritten range and still closes afterwards.
        assert_eq!(out.text, "a b c");
        assert_eq!(spans(&out), vec![(0, 3, 'i'), (2, 3, 'b')]);
    }

    #[test]
    fn process_is_repeatable() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, 1u8));
        let first = engine.process("*x* *y");
        let second = engine.process("*x* *y");
        assert_eq!(first, second);
        assert_eq!(first.text, "x *y");
    }

    #[test]
    fn offsets_count_chars() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, ()));
        let out = engine.process("é *ü* ✓");
        assert_eq!(out.text, "é ü ✓");
        assert_eq!(spans(&out), vec![(2, 1, ())]);
        assert_eq!(out.slice(&out.spans[0]), "ü");
    }

    #[test]
    fn empty_optional_run_still_matches() {
        let mut engine = Engine::new();
        engine.register("*?*", false, strip(1, "bold"));
        let out = engine.process("a ** b");
        assert_eq!(out.text, "a  b");
        assert_eq!(spans(&out), vec![(2, 0, "bold")]);
    }

    #[test]
    fn nested_span_inside_repeated_delimiters() {
        let mut engine = Engine::new();
        engine.register("--?--", true, strip(2, 's'));
        engine.register("*?*", false, strip(1, 'b'));
        // After the bold rewrite the outer match reads "-----"; the kept
        // dash is the middle one, which is the bold one.
        let out = engine.process("--*-*--");
        assert_eq!(out.text, "-");
        assert_eq!(spans(&out), vec![(0, 1, 'b'), (0, 1, 's')]);
    }

    #[test]
    fn unclosed_triggers_stay_pending_once_each() {
        let engine = {
            let mut engine: Engine<()> = Engine::new();
            engine.register("[?](?)", true, |_: &Match<'_>| Outcome::unstyled());
            engine
        };
        let source = "[".repeat(3);
        let mut scan = ScanState::new(&engine.patterns, &source);
        let mut pos = 0;
        for ch in source.chars() {
            pos = scan.feed(ch, pos);
        }
        assert_eq!(scan.pending.len(), 3);
        assert!(scan.pending.iter().all(|a| !a.is_retired()));
    }

    #[test]
    fn retired_attempts_are_swept_after_each_char() {
        let mut engine = Engine::new();
        engine.register("--?--", false, strip(2, ()));
        let source = "--a-- x";
        let mut scan = ScanState::new(&engine.patterns, source);
        let mut pos = 0;
        for ch in source.chars() {
            pos = scan.feed(ch, pos);
        }
        assert!(scan.pending.is_empty());
        assert_eq!(scan.finish().text, "a x");
    }

    #[test]
    fn many_unclosed_brackets_scan_unchanged() {
        let engine = crate::markup_engine(&crate::default_rules()).unwrap();
        let source = format!("{} tail *x*", "[".repeat(4000));
        let out = engine.process(&source);
        assert_eq!(out.text, format!("{} tail x", "[".repeat(4000)));
        assert_eq!(out.spans.len(), 1);
    }
}
