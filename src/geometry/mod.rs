//! Geometry layer: rectangles, polygon rings and region clamping.
//!
//! # Coordinate spaces
//!
//! ```text
//!   storage (Y-up)               pixel (Y-down)
//!   y ▲                          ┌──────────────▶ x
//!     │   ┌────┐                 │   ┌────┐
//!     │   │    │       flip      │   │    │
//!     │   └────┘     ◀──────▶    │   └────┘
//!     └──────────────▶ x       y ▼
//! ```
//!
//! - [`codec`]: rectangle ⇄ polygon ring, plus the vertical flip
//! - [`clamp`](mod@clamp): pixel rectangle → integer IIIF region

pub mod clamp;
pub mod codec;
mod rect;

pub use clamp::{clamp, Bounds, Region};
pub use codec::{bounding_box, flip_vertical, polygon_to_rect, rect_to_polygon, Polygon, Position};
pub use rect::Rect;
