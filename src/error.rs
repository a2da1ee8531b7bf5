use thiserror::Error;

/// Errors raised while decoding a stored polygon into a rectangle.
///
/// Every variant is a form of malformed geometry. Batch callers skip the
/// offending annotation instead of aborting the whole conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Polygon has no rings, or its first ring is empty
    #[error("Malformed geometry: polygon has no ring")]
    MissingRing,

    /// Ring does not describe an area
    #[error("Malformed geometry: ring has {distinct} distinct point(s), need at least 3")]
    TooFewPoints { distinct: usize },

    /// A coordinate is NaN or infinite
    #[error("Malformed geometry: non-finite coordinate")]
    NonFiniteCoordinate,

    /// A position is not a pair of numbers, or the record shape is wrong
    #[error("Malformed geometry: {0}")]
    InvalidCoordinate(String),
}

/// Errors raised while parsing a fragment selector value.
///
/// All numeric parse failures are reported here; callers must never
/// substitute a default rectangle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    /// Value does not start with `xywh=pixel:`
    #[error("Invalid selector: expected prefix 'xywh=pixel:' in {value:?}")]
    MissingPrefix { value: String },

    /// Wrong number of comma-separated components
    #[error("Invalid selector: expected 4 components, found {found}")]
    ComponentCount { found: usize },

    /// A component is not a plain decimal number
    #[error("Invalid selector: component {component:?} is not a decimal number")]
    InvalidNumber { component: String },
}

/// Errors from translating between stored and viewer annotations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Failures while fetching image metadata from an image server.
///
/// These are logged and turned into a degraded cache entry; they are never
/// surfaced to URL-building callers.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// The base URI cannot be turned into an info document URL
    #[error("Invalid image URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Network or connection error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("Image server returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Info document body could not be decoded
    #[error("Invalid info document: {0}")]
    Decode(String),

    /// Info document reports unusable dimensions
    #[error("Invalid image extent: {0}")]
    InvalidExtent(String),

    /// The fetch did not finish within the caller's timeout
    #[error("Metadata fetch timed out after {millis}ms")]
    Timeout { millis: u64 },
}
