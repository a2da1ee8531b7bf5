//! Translation between stored records and viewer annotations.
//!
//! # Vertical flip policy
//!
//! [`to_viewer`] flips the stored polygon from storage space (Y-up) into
//! pixel space (Y-down). [`to_stored`] does **not** flip back: it writes the
//! pixel-space rectangle straight into the polygon. This is the established
//! behaviour of the storage API's records and stays the default, so a record
//! read and written back unchanged moves vertically unless it is centred on
//! the image's horizontal midline.
//!
//! Callers that want the symmetric behaviour use [`to_stored_flipped`] or
//! [`FlipPolicy::Symmetric`], which apply the inverse flip before encoding.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GeometryError, SelectorError, TranslateError};
use crate::geometry::{flip_vertical, polygon_to_rect, rect_to_polygon};
use crate::selector::{self, FragmentSelector};

use super::ids::{is_persisted_id, parse_persisted_id, persisted_viewer_id};
use super::model::{
    AnnotationMetadata, Feature, StoredAnnotation, StoredRecordDraft, TextualBody,
    ViewerAnnotation,
};

// =============================================================================
// Label Lookup
// =============================================================================

/// Resolves an allograph id to a human-readable label.
pub trait LabelLookup {
    fn label(&self, allograph_id: i64) -> Option<String>;
}

impl<F> LabelLookup for F
where
    F: Fn(i64) -> Option<String>,
{
    fn label(&self, allograph_id: i64) -> Option<String> {
        self(allograph_id)
    }
}

impl LabelLookup for HashMap<i64, String> {
    fn label(&self, allograph_id: i64) -> Option<String> {
        self.get(&allograph_id).cloned()
    }
}

/// A lookup that never resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelLookup for NoLabels {
    fn label(&self, _allograph_id: i64) -> Option<String> {
        None
    }
}

// =============================================================================
// Flip Policy
// =============================================================================

/// How pixel rectangles are written back into stored polygons.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FlipPolicy {
    /// Write pixel-space coordinates unchanged (current storage behaviour).
    #[default]
    AsPixels,

    /// Flip back into storage space using the image height.
    Symmetric { image_height: f64 },
}

// =============================================================================
// Translation
// =============================================================================

/// Converts a stored record into a viewer annotation.
///
/// The polygon is decoded to a pixel-space rectangle with `image_height` as
/// the flip reference. A `commenting` body is attached only when the
/// allograph resolves to a label.
pub fn to_viewer<L>(
    stored: &StoredAnnotation,
    image_height: f64,
    labels: &L,
) -> Result<ViewerAnnotation, GeometryError>
where
    L: LabelLookup + ?Sized,
{
    let rect = polygon_to_rect(stored.annotation.polygon(), image_height)?;

    let body = stored
        .allograph
        .and_then(|allograph| labels.label(allograph))
        .map(TextualBody::commenting)
        .into_iter()
        .collect();

    Ok(ViewerAnnotation {
        id: persisted_viewer_id(stored.id),
        selector: FragmentSelector::from_rect(rect),
        body,
        metadata: AnnotationMetadata {
            allograph_id: stored.allograph,
            hand_id: stored.hand,
        },
    })
}

/// Encodes a viewer annotation's selector as a stored feature.
///
/// The pixel-space rectangle is written as-is; see the module docs.
pub fn to_stored(annotation: &ViewerAnnotation) -> Result<Feature, SelectorError> {
    let rect = selector::parse(&annotation.selector.value)?;
    Ok(Feature::from_polygon(rect_to_polygon(rect)))
}

/// Like [`to_stored`], but flips the rectangle back into storage space first.
pub fn to_stored_flipped(
    annotation: &ViewerAnnotation,
    image_height: f64,
) -> Result<Feature, SelectorError> {
    let rect = selector::parse(&annotation.selector.value)?;
    Ok(Feature::from_polygon(rect_to_polygon(flip_vertical(
        rect,
        image_height,
    ))))
}

/// Builds the record to submit to the storage API.
pub fn to_stored_record(
    annotation: &ViewerAnnotation,
    policy: FlipPolicy,
) -> Result<StoredRecordDraft, SelectorError> {
    let feature = match policy {
        FlipPolicy::AsPixels => to_stored(annotation)?,
        FlipPolicy::Symmetric { image_height } => to_stored_flipped(annotation, image_height)?,
    };

    Ok(StoredRecordDraft {
        id: persisted_id(annotation),
        annotation: feature,
        allograph: annotation.metadata.allograph_id,
        hand: annotation.metadata.hand_id,
    })
}

/// Returns true if the annotation came from storage.
pub fn is_persisted(annotation: &ViewerAnnotation) -> bool {
    is_persisted_id(&annotation.id)
}

/// Returns the storage id of a persisted annotation.
pub fn persisted_id(annotation: &ViewerAnnotation) -> Option<i64> {
    parse_persisted_id(&annotation.id)
}

// =============================================================================
// Batch Translation
// =============================================================================

/// A record left out of a batch translation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the input
    pub index: usize,
    /// Storage id, when the record had a readable one
    pub id: Option<i64>,
    pub error: TranslateError,
}

/// Result of [`translate_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub annotations: Vec<ViewerAnnotation>,
    pub skipped: Vec<SkippedRecord>,
}

/// Envelope decoded before the geometry, so shape errors in the polygon are
/// reported as malformed geometry.
#[derive(Deserialize)]
struct RecordEnvelope {
    id: i64,
    annotation: Value,
    #[serde(default)]
    allograph: Option<i64>,
    #[serde(default)]
    hand: Option<i64>,
}

/// Translates raw API records one by one, skipping the malformed ones.
pub fn translate_batch<L>(records: &[Value], image_height: f64, labels: &L) -> BatchOutcome
where
    L: LabelLookup + ?Sized,
{
    let mut outcome = BatchOutcome::default();

    for (index, raw) in records.iter().enumerate() {
        match translate_raw(raw, image_height, labels) {
            Ok(annotation) => outcome.annotations.push(annotation),
            Err(error) => {
                let id = raw.get("id").and_then(Value::as_i64);
                warn!(index, ?id, %error, "Skipping annotation record");
                outcome.skipped.push(SkippedRecord { index, id, error });
            }
        }
    }

    debug!(
        translated = outcome.annotations.len(),
        skipped = outcome.skipped.len(),
        "Batch translation finished"
    );
    outcome
}

fn translate_raw<L>(
    raw: &Value,
    image_height: f64,
    labels: &L,
) -> Result<ViewerAnnotation, TranslateError>
where
    L: LabelLookup + ?Sized,
{
    let envelope = RecordEnvelope::deserialize(raw)
        .map_err(|e| GeometryError::InvalidCoordinate(format!("invalid record: {e}")))?;
    let annotation = Feature::deserialize(&envelope.annotation)
        .map_err(|e| GeometryError::InvalidCoordinate(e.to_string()))?;

    let stored = StoredAnnotation {
        id: envelope.id,
        annotation,
        allograph: envelope.allograph,
        hand: envelope.hand,
    };
    Ok(to_viewer(&stored, image_height, labels)?)
}
