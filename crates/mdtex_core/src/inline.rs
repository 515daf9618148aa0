//! Inline span scanning.
//!
//! A single left-to-right pass. At each position the recognizers are tried in
//! priority order and the first match wins; text between matches becomes
//! literal [`Span::Text`]. Bold, italic and link contents are scanned again
//! for nested spans; code and math contents are taken literally.

use crate::block::{Image, Span};

/// A recognizer looks at the remaining input and, on a match, returns the
/// span and the number of bytes it consumed.
type Recognizer = fn(&str) -> Option<(Span, usize)>;

const RECOGNIZERS: &[Recognizer] = &[bold, italic, code, image, link, math];

/// Scan a fragment of text into inline spans. Empty input yields no spans.
pub fn scan(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        match RECOGNIZERS.iter().find_map(|recognize| recognize(rest)) {
            Some((span, consumed)) => {
                if literal_start < pos {
                    spans.push(Span::Text(text[literal_start..pos].to_string()));
                }
                spans.push(span);
                pos += consumed;
                literal_start = pos;
            }
            None => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if literal_start < text.len() {
        spans.push(Span::Text(text[literal_start..].to_string()));
    }
    spans
}

/// `open`, at least one character, then the first `close` after it. The
/// content may contain the delimiter characters themselves.
fn lazy_delimited<'a>(rest: &'a str, open: &str, close: &str) -> Option<(&'a str, usize)> {
    let inner = rest.strip_prefix(open)?;
    let first = inner.chars().next()?.len_utf8();
    let end = inner[first..].find(close)? + first;
    Some((&inner[..end], open.len() + end + close.len()))
}

/// `delim`, one or more characters other than `delim`, then `delim`.
fn exclusive_delimited(rest: &str, delim: char) -> Option<(&str, usize)> {
    let inner = rest.strip_prefix(delim)?;
    let end = inner.find(delim)?;
    if end == 0 {
        return None;
    }
    Some((&inner[..end], end + 2 * delim.len_utf8()))
}

/// `[label](target)` starting at `rest`, returning label, target and length.
fn bracketed_target(rest: &str) -> Option<(&str, &str, usize)> {
    let inner = rest.strip_prefix('[')?;
    let label_end = inner.find(']')?;
    let after = inner[label_end + 1..].strip_prefix('(')?;
    let target_end = after.find(')')?;
    if target_end == 0 {
        return None;
    }
    let consumed = 1 + label_end + 2 + target_end + 1;
    Some((&inner[..label_end], &after[..target_end], consumed))
}

fn bold(rest: &str) -> Option<(Span, usize)> {
    let (content, consumed) = lazy_delimited(rest, "**", "**")?;
    Some((Span::Bold(scan(content)), consumed))
}

fn italic(rest: &str) -> Option<(Span, usize)> {
    let (content, consumed) = lazy_delimited(rest, "*", "*")?;
    Some((Span::Italic(scan(content)), consumed))
}

fn code(rest: &str) -> Option<(Span, usize)> {
    let (content, consumed) = exclusive_delimited(rest, '`')?;
    Some((Span::Code(content.to_string()), consumed))
}

fn image(rest: &str) -> Option<(Span, usize)> {
    let (alt, url, consumed) = bracketed_target(rest.strip_prefix('!')?)?;
    Some((Span::Image(Image::from_alt(alt, url)), consumed + 1))
}

fn link(rest: &str) -> Option<(Span, usize)> {
    let (label, url, consumed) = bracketed_target(rest)?;
    if label.is_empty() {
        return None;
    }
    let span = Span::Link {
        url: url.to_string(),
        content: scan(label),
    };
    Some((span, consumed))
}

fn math(rest: &str) -> Option<(Span, usize)> {
    let (content, consumed) = exclusive_delimited(rest, '$')?;
    Some((Span::Math(content.to_string()), consumed))
}
