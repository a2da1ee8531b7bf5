//! Axis-aligned rectangle shared by the storage and pixel coordinate spaces.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with its origin at `(x, y)`.
///
/// The value carries no coordinate-space tag. Storage rectangles are Y-up
/// (origin at the bottom-left of the image), pixel rectangles are Y-down
/// (origin at the top-left); callers track which one they hold.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Creates a rectangle from origin and size.
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the right edge (`x + w`).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Returns the far vertical edge (`y + h`).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Returns true if every field is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}
