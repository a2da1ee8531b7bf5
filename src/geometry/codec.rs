//! Conversion between rectangles and closed polygon rings.
//!
//! Stored annotations keep their geometry as a GeoJSON polygon in a Cartesian,
//! Y-up space. The viewer works in pixel space, Y-down. The two are related by
//! a reflection about the image's horizontal midline:
//!
//! ```text
//! pixel_y = reference_height - storage_y - height
//! ```
//!
//! [`rect_to_polygon`] never flips; [`polygon_to_rect`] always flips. Callers
//! that need the opposite direction apply [`flip_vertical`] themselves.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

use super::rect::Rect;

/// A single `[x, y]` position.
pub type Position = [f64; 2];

/// A GeoJSON polygon body: an ordered list of linear rings.
///
/// Only the first ring is read. A well-formed rectangle ring has five
/// positions, the last repeating the first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    pub rings: Vec<Vec<Position>>,
}

impl Polygon {
    /// Creates a polygon from a single ring.
    pub fn from_ring(ring: Vec<Position>) -> Self {
        Self { rings: vec![ring] }
    }

    /// Returns the first ring, if any.
    pub fn exterior(&self) -> Option<&[Position]> {
        self.rings.first().map(Vec::as_slice)
    }

    /// Returns true if the first ring exists and its endpoints coincide.
    pub fn is_closed(&self) -> bool {
        match self.exterior() {
            Some([first, .., last]) => first == last,
            _ => false,
        }
    }
}

/// Emits the closed 5-point ring for `rect`, in the rectangle's own space.
///
/// Corner order is `(x,y) → (x,y+h) → (x+w,y+h) → (x+w,y) → (x,y)`.
pub fn rect_to_polygon(rect: Rect) -> Polygon {
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.right(), rect.bottom());
    Polygon::from_ring(vec![[x0, y0], [x0, y1], [x1, y1], [x1, y0], [x0, y0]])
}

/// Computes the storage-space bounding box of the polygon's first ring.
///
/// Point order does not matter; width and height are `max - min` and thus
/// never negative.
pub fn bounding_box(polygon: &Polygon) -> Result<Rect, GeometryError> {
    let ring = match polygon.exterior() {
        Some(ring) if !ring.is_empty() => ring,
        _ => return Err(GeometryError::MissingRing),
    };

    if ring.iter().any(|[x, y]| !x.is_finite() || !y.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate);
    }

    let distinct = count_distinct(ring, 3);
    if distinct < 3 {
        return Err(GeometryError::TooFewPoints { distinct });
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &[x, y] in ring {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Ok(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Decodes a stored polygon into a pixel-space rectangle.
///
/// The bounding box is taken in storage space and flipped once using
/// `reference_height` (normally the image height in pixels).
///
/// A non-finite reference height, or a box too large to represent, is a
/// [`GeometryError::NonFiniteCoordinate`]: the result must always format as
/// a valid selector.
pub fn polygon_to_rect(polygon: &Polygon, reference_height: f64) -> Result<Rect, GeometryError> {
    if !reference_height.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }

    let storage = bounding_box(polygon)?;
    let rect = flip_vertical(storage, reference_height);
    if !rect.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    Ok(rect)
}

/// Reflects a rectangle between the Y-up and Y-down spaces.
///
/// The mapping is its own inverse: applying it twice with the same height
/// returns the original rectangle.
#[inline]
pub fn flip_vertical(rect: Rect, reference_height: f64) -> Rect {
    Rect::new(rect.x, reference_height - rect.y - rect.h, rect.w, rect.h)
}

/// Counts distinct positions, stopping early once `limit` is reached.
fn count_distinct(ring: &[Position], limit: usize) -> usize {
    let mut seen: Vec<Position> = Vec::with_capacity(limit);
    for point in ring {
        if !seen.contains(point) {
            seen.push(*point);
            if seen.len() >= limit {
                break;
            }
        }
    }
    seen.len()
}
