//! Annotation translation layer.
//!
//! Maps records from the annotation storage API to the annotation editor's
//! representation and back:
//!
//! ```text
//!  StoredAnnotation ──polygon_to_rect──▶ Rect ──selector::format──▶ ViewerAnnotation
//!  (GeoJSON, Y-up)        (flip)      (pixel, Y-down)                ("db:<id>")
//!
//!  ViewerAnnotation ──selector::parse──▶ Rect ──rect_to_polygon──▶ Feature
//! ```
//!
//! - [`model`]: serde wire shapes
//! - [`ids`]: reserved `"db:"` prefix and client id generation
//! - [`translator`]: the conversions themselves

pub mod ids;
pub mod model;
pub mod translator;

pub use ids::{
    is_persisted_id, parse_persisted_id, persisted_viewer_id, ClientIdGenerator,
    DEFAULT_CLIENT_PREFIX, PERSISTED_PREFIX,
};
pub use model::{
    AnnotationMetadata, Feature, FeatureType, GeometryType, PolygonGeometry, StoredAnnotation,
    StoredRecordDraft, TextualBody, ViewerAnnotation,
};
pub use translator::{
    is_persisted, persisted_id, to_stored, to_stored_flipped, to_stored_record, to_viewer,
    translate_batch, BatchOutcome, FlipPolicy, LabelLookup, NoLabels, SkippedRecord,
};
