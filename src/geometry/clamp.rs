//! Clamping of pixel rectangles to IIIF region coordinates.
//!
//! Image servers reject fractional, negative, empty or out-of-bounds regions.
//! [`clamp`] turns an arbitrary pixel rectangle into integer coordinates that
//! are always accepted:
//!
//! 1. Round every field to the nearest integer; floor negative `x`/`y` at 0.
//! 2. With bounds: move an origin lying outside the image back onto its last
//!    row/column, then shrink `w`/`h` so the region ends at the bound.
//! 3. Floor `w` and `h` at 1.
//!
//! The origin is shifted before the size is shrunk, so a region that starts
//! past the right edge becomes a 1-pixel-wide strip on the last column rather
//! than an empty request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Delivery cap reported by the image server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Bounds {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

/// An integer IIIF region, `x,y,w,h` in pixels.
///
/// Produced only by [`clamp`], so `w >= 1` and `h >= 1` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    /// Converts back to a floating-point rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.w),
            f64::from(self.h),
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.w, self.h)
    }
}

/// Clamps `rect` to an integer, non-degenerate region.
///
/// Without `bounds` only rounding, flooring and the minimum size apply.
/// The operation is idempotent: clamping a clamped region with the same
/// bounds returns it unchanged.
pub fn clamp(rect: Rect, bounds: Option<Bounds>) -> Region {
    let mut x = round_to_i64(rect.x).max(0);
    let mut y = round_to_i64(rect.y).max(0);
    let mut w = round_to_i64(rect.w);
    let mut h = round_to_i64(rect.h);

    if let Some(bounds) = bounds {
        let max_w = i64::from(bounds.max_width);
        let max_h = i64::from(bounds.max_height);

        if x >= max_w {
            x = (max_w - 1).max(0);
        }
        if y >= max_h {
            y = (max_h - 1).max(0);
        }

        if x + w > max_w {
            w = max_w - x;
        }
        if y + h > max_h {
            h = max_h - y;
        }
    }

    Region {
        x: to_u32(x),
        y: to_u32(y),
        w: to_u32(w.max(1)),
        h: to_u32(h.max(1)),
    }
}

/// Rounds half away from zero; NaN becomes 0 and infinities saturate.
#[inline]
fn round_to_i64(value: f64) -> i64 {
    // Keep well inside i64 so later additions cannot overflow
    const LIMIT: f64 = (1u64 << 40) as f64;
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(-LIMIT, LIMIT) as i64
}

#[inline]
fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
