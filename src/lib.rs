//! # Palimpsest
//!
//! Annotation geometry and IIIF image addressing for digital palaeography
//! viewers.
//!
//! This library bridges three representations of a rectangular image region:
//!
//! - a GeoJSON polygon persisted by the annotation storage API (Y-up)
//! - a `xywh=pixel:` fragment selector used by the annotation editor (Y-down)
//! - IIIF Image API region/size parameters used to fetch image bytes, clamped
//!   to the server-reported extent and never upscaled
//!
//! ## Architecture
//!
//! - [`geometry`] - Rectangles, polygon rings, vertical flip, region clamping
//! - [`selector`] - Fragment selector parsing and formatting
//! - [`annotation`] - Stored ⇄ viewer annotation translation and identity prefixes
//! - [`image`] - Extent cache and IIIF URL building
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use palimpsest::geometry::{clamp, Bounds};
//! use palimpsest::selector;
//!
//! let rect = selector::parse("xywh=pixel:950,10,100,50").unwrap();
//! let region = clamp(rect, Some(Bounds::new(1000, 1000)));
//! assert_eq!(region.to_string(), "950,10,50,50");
//! ```

pub mod annotation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image;
pub mod selector;

// Re-export commonly used types
pub use annotation::{
    is_persisted, persisted_id, to_stored, to_stored_flipped, to_stored_record, to_viewer,
    translate_batch, BatchOutcome, ClientIdGenerator, Feature, FlipPolicy, LabelLookup, NoLabels,
    StoredAnnotation, StoredRecordDraft, ViewerAnnotation,
};
pub use config::{AddressConfig, Cli, Command};
pub use error::{GeometryError, MetadataError, SelectorError, TranslateError};
pub use geometry::{
    clamp, flip_vertical, polygon_to_rect, rect_to_polygon, Bounds, Polygon, Rect, Region,
};
pub use image::{
    ExtentCache, ExtentSource, ExtentState, HttpExtentSource, ImageAddressBuilder, ImageExtent,
    ImageRequest, ResolvedExtent,
};
pub use selector::FragmentSelector;
