//! # Inline Markup
//!
//! A tiny markdown-like tagger for `markup` nodes. It turns raw text into
//! runs of `(text, Tag)` that the text splitter wraps without knowing about
//! the markers.
//!
//! Recognised at the start of a word: `*bold*`, `_italic_`, `` `code` ``
//! and `[text](url)`. Lines starting with `#` are headings. An opening
//! marker directly followed by a space is literal, a backslash escapes the
//! next character inside a span.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Style of a text span. Renderers treat it opaquely.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Tag: u8 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const CODE = 1 << 2;
        const LINK = 1 << 3;
        const HEADING = 1 << 4;
    }
}

/// Split `raw` into styled runs. Line breaks stay in the text as `\n`.
pub fn tag(raw: &str) -> Vec<(String, Tag)> {
    let mut out = Runs::default();
    for (i, line) in raw.split('\n').enumerate() {
        if i > 0 {
            out.push("\n", Tag::empty());
        }
        let (base, body) = heading(line);
        inline(body, base, &mut out);
    }
    out.0
}

#[derive(Default)]
struct Runs(Vec<(String, Tag)>);

impl Runs {
    fn push(&mut self, text: &str, tag: Tag) {
        if text.is_empty() {
            return;
        }
        match self.0.last_mut() {
            Some((last, t)) if *t == tag => last.push_str(text),
            _ => self.0.push((text.to_string(), tag)),
        }
    }
}

fn heading(line: &str) -> (Tag, &str) {
    let body = line.trim_start_matches('#');
    if body.len() == line.len() {
        (Tag::empty(), line)
    } else {
        (Tag::HEADING, body.trim_start())
    }
}

fn inline(text: &str, base: Tag, out: &mut Runs) {
    let bytes = text.as_bytes();
    let mut plain = 0;
    let mut i = 0;
    let mut word_start = true;
    while i < bytes.len() {
        if word_start {
            if let Some((style, content, consumed)) = span_at(&text[i..]) {
                out.push(&text[plain..i], base);
                out.push(&content, base | style);
                i += consumed;
                plain = i;
                continue;
            }
        }
        word_start = bytes[i].is_ascii_whitespace();
        i += 1;
    }
    out.push(&text[plain..], base);
}

/// Try to read one marked span at the start of `s`.
/// Returns the style, the unescaped content and the consumed byte length.
fn span_at(s: &str) -> Option<(Tag, String, usize)> {
    let (style, close) = match s.chars().next()? {
        '*' => (Tag::BOLD, '*'),
        '_' => (Tag::ITALIC, '_'),
        '`' => (Tag::CODE, '`'),
        '[' => (Tag::LINK, ']'),
        _ => return None,
    };
    let (content, end) = delimited(s, close)?;
    if style != Tag::LINK {
        return Some((style, content, end));
    }
    // links need a `(url)` target, the url itself is not displayed
    let rest = &s[end..];
    let skipped = rest.len() - rest.trim_start().len();
    let target = &rest[skipped..];
    if !target.starts_with('(') {
        return None;
    }
    let (_url, url_end) = delimited(target, ')')?;
    Some((style, content, end + skipped + url_end))
}

fn delimited(s: &str, close: char) -> Option<(String, usize)> {
    let mut content = String::new();
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if i == 1 && c == ' ' {
            return None;
        }
        if escaped {
            content.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == close {
            if content.is_empty() {
                return None;
            }
            return Some((content, i + c.len_utf8()));
        }
        content.push(c);
    }
    None
}
