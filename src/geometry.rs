//! Rectangle primitives shared by the layout engine and the state model.
//!
//! All layout math happens on [`Rect`] in floating point.  Conversion to
//! integer device units ([`DeviceRect`]) happens exactly once, right before
//! a geometry is handed to the environment.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in the display coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Mirror the rectangle across the main diagonal: width and height
    /// swap, and so do top and left.
    ///
    /// This is how every "rows" layout is derived from its "columns"
    /// sibling: transpose the bounds, lay out columns, transpose back.
    /// Applying it twice yields the original rectangle.
    pub fn transpose(self) -> Self {
        Self {
            top: self.left,
            left: self.top,
            width: self.height,
            height: self.width,
        }
    }

    /// Shrink the rectangle by `margin` on all four sides.
    pub fn deflate(self, margin: f64) -> Self {
        Self {
            top: self.top + margin,
            left: self.left + margin,
            width: self.width - 2.0 * margin,
            height: self.height - 2.0 * margin,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the point `(top, left)` lies inside the rectangle.
    /// All four edges are inclusive.
    pub fn contains_point(&self, top: f64, left: f64) -> bool {
        self.top <= top && top <= self.bottom() && self.left <= left && left <= self.right()
    }

    /// Whether `other` lies entirely inside `self`, allowing `tolerance`
    /// of slack on every edge.
    pub fn contains(&self, other: &Rect, tolerance: f64) -> bool {
        other.left >= self.left - tolerance
            && other.top >= self.top - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }

    /// Area shared by two rectangles (zero when they are disjoint or only
    /// touch along an edge).
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    /// Every coordinate is a finite number and the size is non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.top, self.left, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// The same rectangle with negative sizes clamped to zero.
    pub fn saturate(self) -> Rect {
        Rect {
            width: self.width.max(0.0),
            height: self.height.max(0.0),
            ..self
        }
    }

    /// Round every component down to whole device units.  Negative sizes
    /// become zero.
    pub fn to_device(self) -> DeviceRect {
        let r = self.saturate();
        DeviceRect {
            top: r.top.floor() as i32,
            left: r.left.floor() as i32,
            width: r.width.floor() as i32,
            height: r.height.floor() as i32,
        }
    }
}

/// A rectangle in integer device units, as sent to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceRect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}
