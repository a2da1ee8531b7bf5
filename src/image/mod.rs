//! Image addressing layer.
//!
//! Builds IIIF Image API URLs for annotated regions and scaled views, bounded
//! by each image's extent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          ImageAddressBuilder            │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │   ExtentCache   │    │  address (pure URL  │
//! │ (single flight) │    │  composition)       │
//! └────────┬────────┘    └─────────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │  ExtentSource   │
//! │ (HTTP info.json)│
//! └─────────────────┘
//! ```
//!
//! # Components
//!
//! - [`ImageAddressBuilder`]: entry point, async over the cache
//! - [`ExtentCache`]: one write-once entry per base URI
//! - [`ExtentSource`] / [`HttpExtentSource`]: metadata fetch seam
//! - [`address`]: pure URL functions over a known extent

pub mod address;
mod builder;
mod cache;
mod extent;
mod source;

pub use address::{
    full_url, normalize_base_uri, region_url, region_url_for_rect, scaled_url, ImageRequest,
    INFO_DOCUMENT_SUFFIX, SIZE_MAX,
};
pub use builder::{ImageAddressBuilder, DEFAULT_THUMBNAIL_SIZE};
pub use cache::{ExtentCache, ExtentState, ResolvedExtent};
pub use extent::{ImageExtent, InfoDocument, DEFAULT_EXTENT_SIDE};
pub use source::{ExtentSource, HttpExtentSource};
