//! # Geometry
//!
//! Plain value types shared by the layouter, the pager and the draw list.
//! All lengths are in device units (see [`crate::units`]).

use serde::{Deserialize, Serialize};

/// A position: x and y coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A dimension: width and height. Zero or negative means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dim {
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
}

impl Dim {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// An axis-aligned box: position plus dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Whether the height is unbounded ("grow to content").
    pub fn unbounded(&self) -> bool {
        self.h <= 0.0
    }
}

/// Edge values (top, right, bottom, left) used for margin, padding and borders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Shrink `r` by these edges. The resulting size never goes negative.
    ///
    /// An unbounded height stays unbounded.
    pub fn inset(&self, r: Rect) -> Rect {
        let h = if r.unbounded() {
            r.h
        } else {
            (r.h - self.vertical()).max(0.0)
        };
        Rect {
            x: r.x + self.left,
            y: r.y + self.top,
            w: (r.w - self.horizontal()).max(0.0),
            h,
        }
    }

    /// Grow `r` by these edges; the inverse of [`Edges::inset`].
    pub fn outset(&self, r: Rect) -> Rect {
        Rect {
            x: r.x - self.left,
            y: r.y - self.top,
            w: r.w + self.horizontal(),
            h: r.h + self.vertical(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_clamps_to_zero() {
        let r = Edges::uniform(10.0).inset(Rect::new(0.0, 0.0, 15.0, 5.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 0.0, 0.0));
    }

    #[test]
    fn inset_keeps_unbounded_height() {
        let r = Edges::symmetric(4.0, 2.0).inset(Rect::new(0.0, 0.0, 100.0, 0.0));
        assert_eq!(r, Rect::new(2.0, 4.0, 96.0, 0.0));
        assert!(r.unbounded());
    }

    #[test]
    fn outset_undoes_inset() {
        let e = Edges {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        let r = Rect::new(5.0, 5.0, 50.0, 40.0);
        assert_eq!(e.outset(e.inset(r)), r);
    }
}
