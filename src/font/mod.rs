//! # Font Management
//!
//! Registration and lookup of font faces, and glyph measurement.
//!
//! The standard faces (Helvetica and Courier families) are always available
//! from built-in AFM metrics. TrueType/OpenType fonts are parsed once with
//! ttf-parser at registration; afterwards every lookup is a read from
//! in-memory tables, so a registered manager can be shared by any number of
//! layout passes.

pub mod metrics;

pub use metrics::{StandardFont, StandardFontMetrics};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::markup::Tag;
use crate::units::Units;

/// Errors raised while registering or resolving fonts.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("unknown font {name:?}")]
    NotFound { name: String },
    #[error("font {name:?} is not a valid TrueType/OpenType font")]
    Parse { name: String },
    #[error("reading font file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("decoding font {name:?}: {reason}")]
    Decode { name: String, reason: String },
}

/// Metrics of one registered face.
#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the built-in standard faces.
    Standard(StandardFont),
    /// A parsed TrueType/OpenType font.
    TrueType(TrueTypeMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Horizontal kerning adjustments for (previous, current) pairs.
    pub kerning: HashMap<(char, char), i16>,
}

/// Printable Latin-1, the range kerning pairs are collected for.
fn kerning_chars() -> impl Iterator<Item = char> {
    (32u8..=126).chain(160u8..=255).map(char::from)
}

impl TrueTypeMetrics {
    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;
        for code in 32u32..=0xFFFF {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                if ch == 'x' {
                    default_advance = advance;
                }
            }
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        let mut kerning = HashMap::new();
        if let Some(kern) = face.tables().kern {
            let subtables: Vec<_> = kern
                .subtables
                .into_iter()
                .filter(|st| st.horizontal && !st.variable)
                .collect();
            if !subtables.is_empty() {
                let glyphs: Vec<(char, ttf_parser::GlyphId)> = kerning_chars()
                    .filter_map(|ch| face.glyph_index(ch).map(|g| (ch, g)))
                    .collect();
                for &(left, lg) in &glyphs {
                    for &(right, rg) in &glyphs {
                        let value: i16 = subtables
                            .iter()
                            .filter_map(|st| st.glyphs_kerning(lg, rg))
                            .sum();
                        if value != 0 {
                            kerning.insert((left, right), value);
                        }
                    }
                }
            }
        }

        Some(TrueTypeMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            kerning,
        })
    }

    fn scale(&self, units: f64, font_size: f64) -> f64 {
        units / self.units_per_em as f64 * font_size
    }
}

impl FontData {
    /// Advance of `ch` in points, kerned against `prev` when given.
    fn advance(&self, ch: char, prev: Option<char>, font_size: f64) -> f64 {
        match self {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::TrueType(m) => {
                let w = m
                    .advance_widths
                    .get(&ch)
                    .copied()
                    .unwrap_or(m.default_advance) as f64;
                let k = prev
                    .and_then(|p| m.kerning.get(&(p, ch)))
                    .copied()
                    .unwrap_or(0) as f64;
                m.scale(w + k, font_size)
            }
        }
    }

    /// Ascent plus descent in points.
    fn height(&self, font_size: f64) -> f64 {
        match self {
            FontData::Standard(std_font) => std_font.metrics().height(font_size),
            FontData::TrueType(m) => m.scale(m.ascender as f64 - m.descender as f64, font_size),
        }
    }
}

/// A face at a concrete size. Measures in points.
#[derive(Debug, Clone, Copy)]
pub struct Face<'a> {
    data: &'a FontData,
    size: f64,
}

impl Face<'_> {
    /// Advance width of `ch` in points. `prev` is the preceding character
    /// within the same word, `None` at a word or line start.
    pub fn advance(&self, ch: char, prev: Option<char>) -> f64 {
        self.data.advance(ch, prev, self.size)
    }

    /// Width of `text` in points, kerning each pair of adjacent characters.
    pub fn measure(&self, text: &str) -> f64 {
        let mut prev = None;
        let mut width = 0.0;
        for ch in text.chars() {
            width += self.advance(ch, prev);
            prev = Some(ch);
        }
        width
    }

    /// Natural line height (ascent plus descent) in points.
    pub fn height(&self) -> f64 {
        self.data.height(self.size)
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(input)
}

/// The font registry: face name to metrics, plus style variants.
#[derive(Debug, Clone)]
pub struct FontManager {
    units: Units,
    fonts: HashMap<String, FontData>,
    variants: HashMap<(String, Tag), String>,
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new(Units::default())
    }
}

/// Style bits that select a different face.
fn face_bits(tag: Tag) -> Tag {
    let mut bits = tag & (Tag::BOLD | Tag::ITALIC | Tag::CODE);
    if tag.contains(Tag::HEADING) {
        bits |= Tag::BOLD;
    }
    bits
}

impl FontManager {
    pub fn new(units: Units) -> Self {
        let mut m = Self {
            units,
            fonts: HashMap::new(),
            variants: HashMap::new(),
        };
        for std_font in StandardFont::all() {
            m.fonts
                .insert(std_font.name().to_string(), FontData::Standard(std_font));
        }
        for base in ["helvetica", "courier"] {
            m.register_variant(base, Tag::BOLD, &format!("{base}-bold"));
            m.register_variant(base, Tag::ITALIC, &format!("{base}-oblique"));
            m.register_variant(base, Tag::BOLD | Tag::ITALIC, &format!("{base}-boldoblique"));
        }
        m
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Whether a face with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(&name.to_lowercase())
    }

    /// Register TrueType/OpenType font data under `name`.
    pub fn register_ttf(&mut self, name: &str, data: &[u8]) -> Result<(), FontError> {
        let metrics = TrueTypeMetrics::from_font_data(data).ok_or_else(|| FontError::Parse {
            name: name.to_string(),
        })?;
        debug!(
            "registered font {:?}: {} glyphs, {} kerning pairs",
            name,
            metrics.advance_widths.len(),
            metrics.kerning.len()
        );
        self.fonts
            .insert(name.to_lowercase(), FontData::TrueType(metrics));
        Ok(())
    }

    /// Read and register a TrueType/OpenType file.
    pub fn register_ttf_file(&mut self, name: &str, path: impl AsRef<Path>) -> Result<(), FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register_ttf(name, &data)
    }

    /// Register a font from a document source string: a `data:` URI,
    /// a file path (`/`, `./` or `../` prefixed) or raw base64.
    pub fn register_source(&mut self, name: &str, src: &str) -> Result<(), FontError> {
        if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
            return self.register_ttf_file(name, src);
        }
        let b64 = match src.strip_prefix("data:") {
            Some(uri) => match uri.find(',') {
                Some(comma) => &uri[comma + 1..],
                None => {
                    return Err(FontError::Decode {
                        name: name.to_string(),
                        reason: "data URI without payload".to_string(),
                    })
                }
            },
            None => src,
        };
        let data = base64_decode(b64.trim()).map_err(|e| FontError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.register_ttf(name, &data)
    }

    /// Use face `face` for text in font `base` styled with `tag`.
    pub fn register_variant(&mut self, base: &str, tag: Tag, face: &str) {
        self.variants
            .insert((base.to_lowercase(), face_bits(tag)), face.to_lowercase());
    }

    /// The face name for font `name` styled with `tag`.
    ///
    /// Code spans fall back to Courier when `name` has no code variant.
    pub fn styled(&self, name: &str, tag: Tag) -> String {
        let name = name.to_lowercase();
        let bits = face_bits(tag);
        if bits.is_empty() {
            return name;
        }
        if let Some(face) = self.variants.get(&(name.clone(), bits)) {
            return face.clone();
        }
        if bits.contains(Tag::CODE) {
            return self.styled("courier", bits - Tag::CODE);
        }
        name
    }

    /// Resolve a face at a size in points.
    pub fn face(&self, name: &str, size: f64) -> Result<Face<'_>, FontError> {
        let data = self
            .fonts
            .get(&name.to_lowercase())
            .ok_or_else(|| FontError::NotFound {
                name: name.to_string(),
            })?;
        Ok(Face { data, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_faces_are_registered() {
        let m = FontManager::default();
        for f in StandardFont::all() {
            assert!(m.contains(f.name()));
        }
        assert!(m.contains("Helvetica"));
    }

    #[test]
    fn unknown_font_is_an_error() {
        let m = FontManager::default();
        let err = m.face("comic", 10.0).unwrap_err();
        assert!(matches!(err, FontError::NotFound { .. }));
    }

    #[test]
    fn measure_sums_advances() {
        let m = FontManager::default();
        let face = m.face("helvetica", 10.0).unwrap();
        // H 722 + i 222
        assert!((face.measure("Hi") - 9.44).abs() < 1e-9);
    }

    #[test]
    fn height_is_ascent_plus_descent() {
        let m = FontManager::default();
        let face = m.face("helvetica", 10.0).unwrap();
        assert!((face.height() - 9.25).abs() < 1e-9);
    }

    #[test]
    fn style_variants() {
        let m = FontManager::default();
        assert_eq!(m.styled("helvetica", Tag::empty()), "helvetica");
        assert_eq!(m.styled("helvetica", Tag::BOLD), "helvetica-bold");
        assert_eq!(m.styled("helvetica", Tag::HEADING), "helvetica-bold");
        assert_eq!(m.styled("helvetica", Tag::ITALIC | Tag::LINK), "helvetica-oblique");
        assert_eq!(m.styled("helvetica", Tag::CODE), "courier");
        assert_eq!(m.styled("helvetica", Tag::CODE | Tag::BOLD), "courier-bold");
    }

    #[test]
    fn unregistered_variant_falls_back_to_base() {
        let m = FontManager::default();
        assert_eq!(m.styled("custom", Tag::BOLD), "custom");
    }

    #[test]
    fn bad_base64_source() {
        let mut m = FontManager::default();
        let err = m.register_source("x", "data:font/ttf;base64,@@@").unwrap_err();
        assert!(matches!(err, FontError::Decode { .. }));
    }

    #[test]
    fn missing_font_file() {
        let mut m = FontManager::default();
        let err = m.register_source("x", "./no/such/font.ttf").unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
    }

    #[test]
    fn garbage_ttf_is_rejected() {
        let mut m = FontManager::default();
        let err = m.register_ttf("broken", b"not a font").unwrap_err();
        assert!(matches!(err, FontError::Parse { .. }));
    }
}
