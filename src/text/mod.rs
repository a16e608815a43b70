//! # Text Splitting
//!
//! Greedy line breaking of styled runs against a maximum width.
//!
//! Text is tokenized into words, single spaces and hard breaks. Words are
//! packed onto the current line while they fit; a word that does not fit is
//! first broken after a hyphen, then (if it cannot fit even an empty line)
//! broken between characters. Widths are in device units.

use crate::font::{Face, FontError, FontManager};
use crate::markup::Tag;

/// Width tolerance, so that text measured at exactly its own width fits.
const EPSILON: f64 = 1e-9;

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub width: f64,
    pub tag: Tag,
}

/// One wrapped line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
    pub width: f64,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The line's text with styling dropped.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn push(&mut self, text: &str, width: f64, tag: Tag) {
        self.width += width;
        match self.spans.last_mut() {
            Some(last) if last.tag == tag => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.spans.push(Span {
                text: text.to_string(),
                width,
                tag,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Space,
    Break,
}

/// Split `text` into words, collapsed spaces and hard breaks.
/// Spaces next to a hard break are dropped.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        if !ch.is_whitespace() {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(Token::Word(&text[s..i]));
        }
        if ch == '\n' {
            if tokens.last() == Some(&Token::Space) {
                tokens.pop();
            }
            tokens.push(Token::Break);
        } else if !matches!(tokens.last(), Some(Token::Space | Token::Break)) {
            tokens.push(Token::Space);
        }
    }
    if let Some(s) = start {
        tokens.push(Token::Word(&text[s..]));
    }
    tokens
}

/// Wraps text for one font family and size.
pub struct TextSplitter<'a> {
    fonts: &'a FontManager,
    name: &'a str,
    size: f64,
}

impl<'a> TextSplitter<'a> {
    pub fn new(fonts: &'a FontManager, name: &'a str, size: f64) -> Self {
        Self { fonts, name, size }
    }

    /// Wrap styled runs into lines no wider than `max_width` (except for
    /// single characters wider than `max_width`, which get a line each).
    pub fn split(&self, runs: &[(String, Tag)], max_width: f64) -> Result<Vec<Line>, FontError> {
        let mut packer = Packer {
            lines: Vec::new(),
            line: Line::default(),
            space: None,
            max: max_width,
        };
        for (text, tag) in runs {
            let face = self.fonts.face(&self.fonts.styled(self.name, *tag), self.size)?;
            let run = Run {
                face,
                tag: *tag,
                scale: self.fonts.units().scale(),
            };
            for token in tokenize(text) {
                match token {
                    Token::Word(word) => packer.word(&run, word),
                    Token::Space => {
                        packer.space = (!packer.line.is_empty()).then(|| (run.measure(" "), run.tag))
                    }
                    Token::Break => packer.flush(),
                }
            }
        }
        if !packer.line.is_empty() {
            packer.lines.push(packer.line);
        }
        Ok(packer.lines)
    }

    /// Wrap plain text in the given style.
    pub fn split_plain(&self, text: &str, tag: Tag, max_width: f64) -> Result<Vec<Line>, FontError> {
        self.split(&[(text.to_string(), tag)], max_width)
    }
}

struct Run<'a> {
    face: Face<'a>,
    tag: Tag,
    scale: f64,
}

impl Run<'_> {
    fn measure(&self, text: &str) -> f64 {
        self.face.measure(text) * self.scale
    }
}

struct Packer {
    lines: Vec<Line>,
    line: Line,
    /// Width and style of a space pending before the next word.
    space: Option<(f64, Tag)>,
    max: f64,
}

impl Packer {
    fn remaining(&self) -> f64 {
        self.max - self.line.width
    }

    fn flush(&mut self) {
        self.lines.push(std::mem::take(&mut self.line));
        self.space = None;
    }

    /// The pending space, if the current line has content.
    fn pending_space(&self) -> Option<(f64, Tag)> {
        self.space.filter(|_| !self.line.is_empty())
    }

    fn append(&mut self, run: &Run, word: &str, word_w: f64) {
        if let Some((space_w, tag)) = self.pending_space() {
            self.line.push(" ", space_w, tag);
        }
        self.line.push(word, word_w, run.tag);
        self.space = None;
    }

    fn word(&mut self, run: &Run, word: &str) {
        let mut word = word;
        loop {
            let space_w = self.pending_space().map_or(0.0, |(w, _)| w);
            let word_w = run.measure(word);

            if space_w + word_w <= self.remaining() + EPSILON {
                self.append(run, word, word_w);
                return;
            }

            if let Some((prefix, rest)) = self.hyphen_prefix(run, space_w, word) {
                let prefix_w = run.measure(prefix);
                self.append(run, prefix, prefix_w);
                self.flush();
                if rest.is_empty() {
                    return;
                }
                word = rest;
                continue;
            }

            if word_w > self.max + EPSILON {
                if !self.line.is_empty() {
                    self.flush();
                }
                self.force(run, word);
                return;
            }

            self.flush();
        }
    }

    /// The longest prefix ending in a hyphen that fits the current line.
    fn hyphen_prefix<'w>(&self, run: &Run, space_w: f64, word: &'w str) -> Option<(&'w str, &'w str)> {
        let avail = self.remaining() - space_w + EPSILON;
        word.match_indices('-')
            .map(|(i, _)| i + 1)
            .filter(|&end| end < word.len())
            .take_while(|&end| run.measure(&word[..end]) <= avail)
            .last()
            .map(|end| word.split_at(end))
    }

    /// Break a word wider than a whole line between characters. Every
    /// chunk takes at least one character; the last chunk stays open.
    fn force(&mut self, run: &Run, word: &str) {
        let mut chunk_start = 0;
        let mut width = 0.0;
        let mut prev = None;
        for (i, ch) in word.char_indices() {
            let advance = run.face.advance(ch, prev) * run.scale;
            if i > chunk_start && width + advance > self.max + EPSILON {
                self.line.push(&word[chunk_start..i], width, run.tag);
                self.flush();
                chunk_start = i;
                width = run.face.advance(ch, None) * run.scale;
            } else {
                width += advance;
            }
            prev = Some(ch);
        }
        self.line.push(&word[chunk_start..], width, run.tag);
        self.space = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str, max: f64) -> Vec<Line> {
        let fonts = FontManager::default();
        TextSplitter::new(&fonts, "helvetica", 10.0)
            .split_plain(text, Tag::empty(), max)
            .unwrap()
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(
            tokenize("a  \t b \n c"),
            vec![
                Token::Word("a"),
                Token::Space,
                Token::Word("b"),
                Token::Break,
                Token::Word("c"),
            ]
        );
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(split("", 100.0).is_empty());
    }

    #[test]
    fn fits_on_one_line() {
        let lines = split("Hello World", 1000.0);
        assert_eq!(texts(&lines), vec!["Hello World"]);
        assert_eq!(lines[0].spans.len(), 1);
    }

    #[test]
    fn wraps_at_word_boundary() {
        let lines = split("Hello World", 120.0);
        assert_eq!(texts(&lines), vec!["Hello", "World"]);
        assert!(lines.iter().all(|l| l.width <= 120.0));
    }

    #[test]
    fn hard_breaks_keep_empty_lines() {
        let lines = split("a\n\nb", 100.0);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
    }

    #[test]
    fn hyphen_is_a_soft_break() {
        // "Hello-" fits in 80 dots but "Hello-World" does not
        let lines = split("Hello-World", 80.0);
        assert_eq!(texts(&lines), vec!["Hello-", "World"]);
    }

    #[test]
    fn long_word_is_force_broken() {
        let lines = split("Hello", 30.0);
        assert_eq!(texts(&lines), vec!["H", "ell", "o"]);
        assert!(lines.iter().all(|l| l.width <= 30.0));
    }

    #[test]
    fn glyph_wider_than_line_gets_own_line() {
        let lines = split("WW", 1.0);
        assert_eq!(texts(&lines), vec!["W", "W"]);
    }

    #[test]
    fn forced_tail_keeps_packing() {
        // the last chunk of a forced word stays open for the next word
        let lines = split("WWW a", 60.0);
        assert_eq!(texts(&lines), vec!["WW", "W a"]);
    }

    #[test]
    fn runs_merge_by_tag() {
        let fonts = FontManager::default();
        let splitter = TextSplitter::new(&fonts, "helvetica", 10.0);
        let runs = vec![
            ("plain ".to_string(), Tag::empty()),
            ("bold".to_string(), Tag::BOLD),
            (" more".to_string(), Tag::empty()),
        ];
        let lines = splitter.split(&runs, 1000.0).unwrap();
        assert_eq!(lines.len(), 1);
        let tags: Vec<Tag> = lines[0].spans.iter().map(|s| s.tag).collect();
        assert_eq!(tags, vec![Tag::empty(), Tag::BOLD, Tag::empty()]);
        assert_eq!(lines[0].text(), "plain bold more");
        let sum: f64 = lines[0].spans.iter().map(|s| s.width).sum();
        assert!((sum - lines[0].width).abs() < 1e-9);
    }

    #[test]
    fn unknown_font_fails() {
        let fonts = FontManager::default();
        let res = TextSplitter::new(&fonts, "nope", 10.0).split_plain("x", Tag::empty(), 10.0);
        assert!(res.is_err());
    }
}
