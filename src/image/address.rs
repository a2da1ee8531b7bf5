//! IIIF Image API URL composition.
//!
//! Everything here is pure: the extent is passed in, nothing is fetched.
//! URLs follow the four-segment convention:
//!
//! ```text
//! {base}/{region}/{size}/{rotation}/{quality}.{format}
//! ```

use url::Url;

use crate::error::SelectorError;
use crate::geometry::{clamp, Rect};
use crate::selector;

use super::extent::ImageExtent;

/// Path suffix of the info document under a base URI.
pub const INFO_DOCUMENT_SUFFIX: &str = "/info.json";

/// Size token that asks for the largest size the server will deliver.
pub const SIZE_MAX: &str = "max";

/// Parameters of a full image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub region: String,
    pub size: String,
    pub rotation: String,
    pub quality: String,
    pub format: String,
}

impl Default for ImageRequest {
    fn default() -> Self {
        Self {
            region: "full".to_string(),
            size: SIZE_MAX.to_string(),
            rotation: "0".to_string(),
            quality: "default".to_string(),
            format: "jpg".to_string(),
        }
    }
}

/// Normalizes an image base URI.
///
/// Strips a trailing `/info.json` and trailing slashes, then rewrites the
/// path so every segment is percent-encoded exactly once: segments are
/// decoded and re-encoded, so `Cod.%20Sang.` and `Cod. Sang.` agree while an
/// encoded slash (`%2F`) stays inside its segment. The result is idempotent
/// and is both the cache key and the base of every emitted URL.
///
/// URIs that cannot be parsed, or whose segments do not decode to UTF-8, are
/// only trimmed.
pub fn normalize_base_uri(base_uri: &str) -> String {
    let trimmed = base_uri.trim_end_matches('/');
    let trimmed = trimmed
        .strip_suffix(INFO_DOCUMENT_SUFFIX)
        .map(|rest| rest.trim_end_matches('/'))
        .unwrap_or(trimmed);

    match Url::parse(trimmed) {
        Ok(url) => encode_path_once(url).unwrap_or_else(|| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    }
}

fn encode_path_once(mut url: Url) -> Option<String> {
    let segments = url
        .path_segments()?
        .map(|segment| urlencoding::decode(segment).map(|decoded| decoded.into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut().ok()?.clear().extend(segments);

    Some(url.as_str().trim_end_matches('/').to_string())
}

/// Composes `{base}/{region}/{size}/{rotation}/{quality}.{format}`.
pub fn full_url(base_uri: &str, request: &ImageRequest) -> String {
    format!(
        "{}/{}/{}/{}/{}.{}",
        normalize_base_uri(base_uri),
        request.region,
        request.size,
        request.rotation,
        request.quality,
        request.format
    )
}

/// Builds a thumbnail URL for the region named by a selector.
///
/// The region is clamped to the extent's delivery cap. If the clamped width
/// is narrower than `thumbnail_size`, the size is `max` so the server is
/// never asked to upscale; otherwise it is `<thumbnail_size>,`.
pub fn region_url(
    base_uri: &str,
    selector_value: &str,
    thumbnail_size: u32,
    extent: &ImageExtent,
) -> Result<String, SelectorError> {
    let rect = selector::parse(selector_value)?;
    Ok(region_url_for_rect(base_uri, rect, thumbnail_size, extent))
}

/// [`region_url`] for an already parsed pixel rectangle.
pub fn region_url_for_rect(
    base_uri: &str,
    rect: Rect,
    thumbnail_size: u32,
    extent: &ImageExtent,
) -> String {
    let region = clamp(rect, Some(extent.bounds()));

    let size = if region.w < thumbnail_size {
        SIZE_MAX.to_string()
    } else {
        format!("{thumbnail_size},")
    };

    let request = ImageRequest {
        region: region.to_string(),
        size,
        ..ImageRequest::default()
    };
    full_url(base_uri, &request)
}

/// Builds a URL for the whole image scaled by `scale`.
///
/// A scale of 1 or more always requests `max`. Smaller scales request
/// `round(width * scale)` pixels wide, falling back to `max` when that would
/// reach the delivery cap.
pub fn scaled_url(base_uri: &str, scale: f64, extent: &ImageExtent) -> String {
    let request = ImageRequest {
        size: scaled_size(scale, extent),
        ..ImageRequest::default()
    };
    full_url(base_uri, &request)
}

fn scaled_size(scale: f64, extent: &ImageExtent) -> String {
    if scale >= 1.0 {
        return SIZE_MAX.to_string();
    }

    let target = (f64::from(extent.width) * scale).round();
    // NaN and negative scales collapse to the smallest request
    let target = if target.is_nan() { 1.0 } else { target.max(1.0) };

    if target >= f64::from(extent.max_width) {
        SIZE_MAX.to_string()
    } else {
        format!("{},", target as u32)
    }
}
