//! Image extents reported by IIIF info documents.

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::geometry::Bounds;

/// Side length of the square extent used when metadata is unavailable.
pub const DEFAULT_EXTENT_SIDE: u32 = 1000;

/// Pixel dimensions of a source image plus the server's delivery cap.
///
/// `max_width`/`max_height` may be smaller than the raw dimensions and govern
/// all clamping and sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageExtent {
    pub width: u32,
    pub height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl ImageExtent {
    /// An extent whose cap equals its raw dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            max_width: width,
            max_height: height,
        }
    }

    /// A square fallback extent.
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// The delivery cap as clamp bounds.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.max_width, self.max_height)
    }
}

impl Default for ImageExtent {
    fn default() -> Self {
        Self::square(DEFAULT_EXTENT_SIDE)
    }
}

/// The subset of a IIIF info document this crate reads.
///
/// Unknown keys (`@context`, `profile`, `tiles`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InfoDocument {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "maxWidth", default)]
    pub max_width: Option<u32>,
    #[serde(rename = "maxHeight", default)]
    pub max_height: Option<u32>,
}

impl InfoDocument {
    /// Resolves the effective extent.
    ///
    /// A missing `maxHeight` falls back to `maxWidth` (IIIF Image API 3), and
    /// neither cap may exceed the raw dimensions.
    pub fn extent(&self) -> Result<ImageExtent, MetadataError> {
        if self.width == 0 || self.height == 0 {
            return Err(MetadataError::InvalidExtent(format!(
                "{}x{}",
                self.width, self.height
            )));
        }

        let max_width = self.max_width.unwrap_or(self.width).min(self.width);
        let max_height = self
            .max_height
            .or(self.max_width)
            .unwrap_or(self.height)
            .min(self.height);

        if max_width == 0 || max_height == 0 {
            return Err(MetadataError::InvalidExtent(format!(
                "delivery cap {max_width}x{max_height}"
            )));
        }

        Ok(ImageExtent {
            width: self.width,
            height: self.height,
            max_width,
            max_height,
        })
    }
}
