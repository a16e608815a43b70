//! Advance widths of the standard PDF faces, from the Adobe AFM files.
//!
//! Only printable ASCII is tabulated. Latin-1 letters fall back to the
//! width of their base letter, anything else to the width of `x`.

/// The built-in faces. They need no font files and no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The registered face name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helvetica => "helvetica",
            Self::HelveticaBold => "helvetica-bold",
            Self::HelveticaOblique => "helvetica-oblique",
            Self::HelveticaBoldOblique => "helvetica-boldoblique",
            Self::Courier => "courier",
            Self::CourierBold => "courier-bold",
            Self::CourierOblique => "courier-oblique",
            Self::CourierBoldOblique => "courier-boldoblique",
        }
    }

    pub fn all() -> [StandardFont; 8] {
        [
            Self::Helvetica,
            Self::HelveticaBold,
            Self::HelveticaOblique,
            Self::HelveticaBoldOblique,
            Self::Courier,
            Self::CourierBold,
            Self::CourierOblique,
            Self::CourierBoldOblique,
        ]
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            // oblique faces share the upright widths
            Self::Helvetica | Self::HelveticaOblique => &HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &HELVETICA_BOLD,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &COURIER
            }
        }
    }
}

/// Widths in 1/1000 em for chars 32..=126, plus vertical metrics.
#[derive(Debug)]
pub struct StandardFontMetrics {
    widths: [u16; 95],
    pub ascender: i16,
    pub descender: i16,
}

impl StandardFontMetrics {
    /// Advance width in 1/1000 em.
    pub fn units(&self, ch: char) -> u16 {
        let ch = latin1_base(ch);
        match ch as u32 {
            code @ 32..=126 => self.widths[(code - 32) as usize],
            _ => self.widths[(b'x' - 32) as usize],
        }
    }

    /// Advance width in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.units(ch) as f64 / 1000.0 * font_size
    }

    /// Ascent plus descent in points.
    pub fn height(&self, font_size: f64) -> f64 {
        (self.ascender as f64 - self.descender as f64) / 1000.0 * font_size
    }
}

fn latin1_base(ch: char) -> char {
    match ch {
        '\u{a0}' => ' ',
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'ß' => 'B',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'µ' => 'u',
        _ => ch,
    }
}

#[rustfmt::skip]
static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: [
        // space ! " # $ % & ' ( ) * + , - . /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        278, 278, 584, 584, 584, 556, 1015,
        // A-Z
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        278, 278, 278, 469, 556, 333,
        // a-z
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // { | } ~
        334, 260, 334, 584,
    ],
    ascender: 718,
    descender: -207,
};

#[rustfmt::skip]
static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    ascender: 718,
    descender: -207,
};

static COURIER: StandardFontMetrics = StandardFontMetrics {
    widths: [600; 95],
    ascender: 629,
    descender: -157,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space() {
        let w = StandardFont::Helvetica.metrics().char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn bold_is_wider() {
        let regular = StandardFont::Helvetica.metrics().units('b');
        let bold = StandardFont::HelveticaBold.metrics().units('b');
        assert!(bold > regular);
    }

    #[test]
    fn courier_is_monospaced() {
        let m = StandardFont::Courier.metrics();
        assert_eq!(m.units('i'), m.units('W'));
    }

    #[test]
    fn umlauts_use_base_letter() {
        let m = StandardFont::Helvetica.metrics();
        assert_eq!(m.units('ö'), m.units('o'));
        assert_eq!(m.units('Ü'), m.units('U'));
    }
}
