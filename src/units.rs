//! # Units
//!
//! Fonts are measured in typographic points (1/72 inch). Documents are laid
//! out in device units ("dots"), whose size depends on the output device:
//! 203.2 dpi is 8 dots per millimetre, the native grid of most thermal
//! label printers.

/// Converts between points and device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    dpi: f64,
}

/// Points per inch.
const PT_PER_INCH: f64 = 72.0;

impl Default for Units {
    fn default() -> Self {
        Self::new(203.2)
    }
}

impl Units {
    pub fn new(dpi: f64) -> Self {
        Self { dpi }
    }

    /// Device units per point.
    pub fn scale(&self) -> f64 {
        self.dpi / PT_PER_INCH
    }

    pub fn pt_to_dot(&self, pt: f64) -> f64 {
        pt * self.scale()
    }

    pub fn dot_to_pt(&self, dot: f64) -> f64 {
        dot / self.scale()
    }
}
