//! Turning a [`StyledText`] into something a terminal can show.
//!
//! The engine only reports spans; everything here is presentation.

use crossterm::style::{Attribute, Color, ContentStyle, StyledContent};
use markscan_engine::{Markup, Style, StyledText};

/// Terminal style for one markup style.
fn style_for(markup: &Markup, style: &mut ContentStyle) {
    match markup.style {
        Style::Bold => style.attributes.set(Attribute::Bold),
        Style::Italic => style.attributes.set(Attribute::Italic),
        Style::Strikethrough => style.attributes.set(Attribute::CrossedOut),
        Style::Underline => style.attributes.set(Attribute::Underlined),
        Style::Code => style.foreground_color = Some(Color::Yellow),
        Style::Link => {
            style.attributes.set(Attribute::Underlined);
            style.foreground_color = Some(Color::Blue);
        }
    }
}

/// Splits the text into runs of chars covered by the same markup.
fn runs(styled: &StyledText<Markup>) -> Vec<(String, Vec<&Markup>)> {
    let mut out: Vec<(String, Vec<&Markup>)> = Vec::new();
    for (offset, ch) in styled.text.chars().enumerate() {
        let covering: Vec<&Markup> = styled.spans_at(offset).map(|s| &s.attributes).collect();
        match out.last_mut() {
            Some((run, markups)) if *markups == covering => run.push(ch),
            _ => out.push((ch.to_string(), covering)),
        }
    }
    out
}

/// Renders with ANSI escape sequences.
pub fn ansi(styled: &StyledText<Markup>) -> String {
    if styled.is_unstyled() {
        return styled.text.clone();
    }
    let mut out = String::new();
    for (run, covering) in runs(styled) {
        if covering.is_empty() {
            out.push_str(&run);
            continue;
        }
        let mut style = ContentStyle::new();
        for markup in covering {
            style_for(markup, &mut style);
        }
        out.push_str(&StyledContent::new(style, run).to_string());
    }
    out
}

/// The final text followed by one line per span.
pub fn plain(styled: &StyledText<Markup>) -> String {
    let mut out = styled.text.clone();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    for span in &styled.spans {
        out.push_str(&format!(
            "{}+{} {:?} {:?}",
            span.start,
            span.len,
            span.attributes.style,
            styled.slice(span)
        ));
        if let Some(url) = &span.attributes.url {
            out.push_str(&format!(" -> {url}"));
        }
        out.push('\n');
    }
    out
}

pub fn json(styled: &StyledText<Markup>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(styled)
}
