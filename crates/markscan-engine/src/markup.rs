//! # Markup Rules
//!
//! A small markup dialect built on the public registration API. Each
//! [`MarkupRule`] names a pattern, a [`Style`] and a [`Transform`] telling
//! how the matched text is rewritten. Rules are plain data, so they can also
//! come from a config file.
//!
//! | pattern   | style         | result                     |
//! |-----------|---------------|----------------------------|
//! | `*?*`     | bold          | `*a*` → `a`                |
//! | `_?_`     | italic        | `_a_` → `a`                |
//! | `--?--`   | strikethrough | `--a--` → `a`              |
//! | `` `?` `` | code          | `` `a` `` → `a`            |
//! | `[?](?)`  | link          | `[a](u)` → `a`, url `u`    |

use serde::{Deserialize, Serialize};

use crate::{
    engine::{Engine, Match, Outcome},
    pattern::{Pattern, PatternError},
};

/// Pattern text of the built-in rules.
pub struct Delimiters;

impl Delimiters {
    pub const BOLD: &'static str = "*?*";
    pub const ITALIC: &'static str = "_?_";
    pub const STRIKETHROUGH: &'static str = "--?--";
    pub const CODE: &'static str = "`?`";
    pub const LINK: &'static str = "[?](?)";
    /// Separates the label from the url once delimiters are stripped.
    pub const LINK_SEPARATOR: &'static str = "](";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    Link,
}

/// The attribute value attached to spans produced by markup rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Markup {
    pub fn new(style: Style) -> Self {
        Self { style, url: None }
    }

    pub fn link(style: Style, url: impl Into<String>) -> Self {
        Self {
            style,
            url: Some(url.into()),
        }
    }
}

/// How a rule rewrites the text it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Drop the delimiters, keep what sits between them.
    #[default]
    Strip,
    /// Keep the matched text as-is and only tag it.
    Keep,
    /// Strip delimiters, then split `label](url` and keep the label.
    Link,
}

impl Transform {
    /// Decides the outcome for `matched`, given the number of delimiter
    /// chars on each side.
    pub fn apply(
        self,
        matched: &str,
        leading: usize,
        trailing: usize,
        style: Style,
    ) -> Outcome<Markup> {
        match self {
            Transform::Keep => Outcome::styled(matched, Markup::new(style)),
            Transform::Strip => match strip_delimiters(matched, leading, trailing) {
                Some(inner) => Outcome::styled(inner, Markup::new(style)),
                None => Outcome::unstyled(),
            },
            Transform::Link => {
                let parts = strip_delimiters(matched, leading, trailing)
                    .and_then(|inner| inner.split_once(Delimiters::LINK_SEPARATOR));
                match parts {
                    Some((label, url)) if !label.is_empty() => {
                        Outcome::styled(label, Markup::link(style, url))
                    }
                    _ => Outcome::unstyled(),
                }
            }
        }
    }
}

/// Returns the text between `leading` and `trailing` delimiter chars, or
/// `None` when nothing would be left.
fn strip_delimiters(matched: &str, leading: usize, trailing: usize) -> Option<&str> {
    let total = matched.chars().count();
    if total <= leading + trailing {
        return None;
    }
    let start = matched.char_indices().nth(leading).map(|(i, _)| i)?;
    let end = matched
        .char_indices()
        .nth(total - trailing)
        .map_or(matched.len(), |(i, _)| i);
    Some(&matched[start..end])
}

/// A declarative pattern registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupRule {
    pub pattern: String,
    #[serde(default)]
    pub recursive: bool,
    pub style: Style,
    #[serde(default)]
    pub transform: Transform,
}

impl MarkupRule {
    pub fn new(pattern: impl Into<String>, style: Style) -> Self {
        Self {
            pattern: pattern.into(),
            recursive: false,
            style,
            transform: Transform::default(),
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Registers this rule on `engine`.
    pub fn install(&self, engine: &mut Engine<Markup>) -> Result<(), PatternError> {
        let pattern = Pattern::parse(&self.pattern)?;
        if !pattern.has_checkpoint() && self.transform != Transform::Keep {
            log::warn!(
                "rule {:?} has no checkpoint; stripping it leaves nothing, use transform = \"keep\"",
                self.pattern
            );
        }
        let leading = pattern.leading_len();
        let trailing = pattern.trailing_len();
        let style = self.style;
        let transform = self.transform;
        engine.register_pattern(pattern, self.recursive, move |m: &Match<'_>| {
            transform.apply(m.matched, leading, trailing, style)
        });
        Ok(())
    }
}

pub fn default_rules() -> Vec<MarkupRule> {
    vec![
        MarkupRule::new(Delimiters::BOLD, Style::Bold),
        MarkupRule::new(Delimiters::ITALIC, Style::Italic),
        MarkupRule::new(Delimiters::STRIKETHROUGH, Style::Strikethrough),
        MarkupRule::new(Delimiters::CODE, Style::Code),
        MarkupRule::new(Delimiters::LINK, Style::Link)
            .with_recursive(true)
            .with_transform(Transform::Link),
    ]
}

/// Builds an engine with `rules` registered in order.
pub fn markup_engine(rules: &[MarkupRule]) -> Result<Engine<Markup>, PatternError> {
    let mut engine = Engine::new();
    for rule in rules {
        rule.install(&mut engine)?;
    }
    Ok(engine)
}
