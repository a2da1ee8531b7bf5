//! Image address builder.
//!
//! Composes the extent cache with the pure URL functions in
//! [`address`](super::address):
//!
//! ```text
//!  build_region_url()   build_scaled_url()        build_full_url()
//!          │                   │                         │
//!          ▼                   ▼                         │
//!  ┌─────────────────────────────────────┐               │
//!  │ ExtentCache (single flight per URI) │               │
//!  └──────────────────┬──────────────────┘               │
//!                     ▼                                  ▼
//!  address::region_url_for_rect / scaled_url      address::full_url
//! ```

use std::sync::Arc;

use crate::error::SelectorError;
use crate::selector;

use super::address::{full_url, region_url_for_rect, scaled_url, ImageRequest};
use super::cache::{ExtentCache, ResolvedExtent};
use super::source::ExtentSource;

/// Default thumbnail width in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

/// Builds IIIF Image API URLs, bounded by each image's extent.
///
/// # Example
///
/// ```ignore
/// use palimpsest::image::{HttpExtentSource, ImageAddressBuilder};
///
/// let builder = ImageAddressBuilder::new(HttpExtentSource::new()?);
///
/// let url = builder
///     .build_region_url("https://iiif.example.org/iiif/3/ms-12_f1r", "xywh=pixel:950,10,100,50", 200)
///     .await?;
/// ```
pub struct ImageAddressBuilder<S: ExtentSource + 'static> {
    cache: Arc<ExtentCache<S>>,
}

impl<S: ExtentSource + 'static> ImageAddressBuilder<S> {
    /// Create a builder with its own cache.
    pub fn new(source: S) -> Self {
        Self {
            cache: Arc::new(ExtentCache::new(source)),
        }
    }

    /// Create a builder over a shared cache.
    pub fn with_shared_cache(cache: Arc<ExtentCache<S>>) -> Self {
        Self { cache }
    }

    /// The extent cache backing this builder.
    pub fn cache(&self) -> &Arc<ExtentCache<S>> {
        &self.cache
    }

    /// Resolve the extent of an image (fetching once per base URI).
    pub async fn extent(&self, base_uri: &str) -> ResolvedExtent {
        self.cache.get(base_uri).await
    }

    /// URL of the region named by `selector_value`, sized for a thumbnail.
    ///
    /// The selector is validated before any metadata is fetched.
    pub async fn build_region_url(
        &self,
        base_uri: &str,
        selector_value: &str,
        thumbnail_size: u32,
    ) -> Result<String, SelectorError> {
        let rect = selector::parse(selector_value)?;
        let extent = self.cache.get(base_uri).await.extent();
        Ok(region_url_for_rect(base_uri, rect, thumbnail_size, &extent))
    }

    /// URL of the whole image scaled by `scale`, never upscaled.
    pub async fn build_scaled_url(&self, base_uri: &str, scale: f64) -> String {
        let extent = self.cache.get(base_uri).await.extent();
        scaled_url(base_uri, scale, &extent)
    }

    /// URL composed directly from request parameters; no metadata needed.
    pub fn build_full_url(&self, base_uri: &str, request: &ImageRequest) -> String {
        full_url(base_uri, request)
    }
}
