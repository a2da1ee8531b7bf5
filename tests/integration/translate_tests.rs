//! Annotation translation integration tests.
//!
//! Tests verify:
//! - Raw storage API records become viewer annotations with labels
//! - Malformed records are skipped, the rest of the batch survives
//! - Viewer edits become create or update drafts
//! - Read-then-write behaviour under each flip policy

use std::collections::HashMap;

use serde_json::json;

use palimpsest::annotation::{
    is_persisted, persisted_id, to_stored_record, translate_batch, ClientIdGenerator, FlipPolicy,
    NoLabels, ViewerAnnotation,
};
use palimpsest::error::{GeometryError, TranslateError};
use palimpsest::geometry::{polygon_to_rect, Rect};
use palimpsest::selector::FragmentSelector;

use super::test_utils::stored_record;

fn labels() -> HashMap<i64, String> {
    HashMap::from([(4, "a, Caroline minuscule".to_string())])
}

// =============================================================================
// Storage To Viewer
// =============================================================================

#[test]
fn test_stored_record_to_selector() {
    let records = vec![stored_record(7, 10.0, 60.0, 30.0, 40.0, Some(4))];

    let outcome = translate_batch(&records, 100.0, &labels());

    assert!(outcome.skipped.is_empty());
    let annotation = &outcome.annotations[0];
    assert_eq!(annotation.id, "db:7");
    assert_eq!(annotation.selector.value, "xywh=pixel:10,0,30,40");
    assert_eq!(annotation.label(), Some("a, Caroline minuscule"));
    assert_eq!(annotation.metadata.allograph_id, Some(4));
    assert_eq!(annotation.metadata.hand_id, Some(3));
}

#[test]
fn test_unknown_allograph_has_no_body() {
    let records = vec![
        stored_record(1, 0.0, 0.0, 5.0, 5.0, Some(99)),
        stored_record(2, 0.0, 0.0, 5.0, 5.0, None),
    ];

    let outcome = translate_batch(&records, 100.0, &labels());

    assert_eq!(outcome.annotations.len(), 2);
    assert!(outcome.annotations.iter().all(|a| a.body.is_empty()));

    let json = serde_json::to_value(&outcome.annotations[0]).unwrap();
    assert!(json.get("body").is_none());
}

#[test]
fn test_malformed_records_are_skipped() {
    let records = vec![
        stored_record(1, 10.0, 10.0, 20.0, 20.0, None),
        json!({
            "id": 2,
            "annotation": {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [] }
            }
        }),
        json!({
            "id": 3,
            "annotation": {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[5, 5], [5, 5], [5, 5]]] }
            }
        }),
        json!({ "id": 4, "annotation": "not a feature" }),
        stored_record(5, 30.0, 30.0, 10.0, 10.0, None),
    ];

    let outcome = translate_batch(&records, 200.0, &NoLabels);

    let ids: Vec<&str> = outcome.annotations.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["db:1", "db:5"]);

    let skipped: Vec<(usize, Option<i64>)> =
        outcome.skipped.iter().map(|s| (s.index, s.id)).collect();
    assert_eq!(skipped, vec![(1, Some(2)), (2, Some(3)), (3, Some(4))]);

    assert_eq!(
        outcome.skipped[0].error,
        TranslateError::Geometry(GeometryError::MissingRing)
    );
    assert!(matches!(
        outcome.skipped[1].error,
        TranslateError::Geometry(GeometryError::TooFewPoints { .. })
    ));
}

// =============================================================================
// Viewer To Storage
// =============================================================================

#[test]
fn test_identity_prefix() {
    let persisted = ViewerAnnotation {
        id: "db:42".to_string(),
        selector: FragmentSelector::new("xywh=pixel:1,2,3,4"),
        body: Vec::new(),
        metadata: Default::default(),
    };
    let fresh = ViewerAnnotation {
        id: "tmp-1".to_string(),
        ..persisted.clone()
    };

    assert!(is_persisted(&persisted));
    assert_eq!(persisted_id(&persisted), Some(42));
    assert!(!is_persisted(&fresh));
    assert_eq!(persisted_id(&fresh), None);
}

#[test]
fn test_new_and_edited_annotations_become_drafts() {
    let ids = ClientIdGenerator::new();
    let created = ViewerAnnotation {
        id: ids.next_id(),
        selector: FragmentSelector::new("xywh=pixel:10,20,30,40"),
        body: Vec::new(),
        metadata: Default::default(),
    };
    let edited = ViewerAnnotation {
        id: "db:9".to_string(),
        ..created.clone()
    };

    let create = to_stored_record(&created, FlipPolicy::AsPixels).unwrap();
    let update = to_stored_record(&edited, FlipPolicy::AsPixels).unwrap();

    assert_eq!(create.id, None);
    assert_eq!(update.id, Some(9));
    assert_eq!(
        polygon_to_rect(create.annotation.polygon(), 0.0).map(|r| r.w),
        Ok(30.0)
    );
}

#[test]
fn test_invalid_selector_is_rejected() {
    let annotation = ViewerAnnotation {
        id: "db:1".to_string(),
        selector: FragmentSelector::new("xywh=pixel:10,20,thirty,40"),
        body: Vec::new(),
        metadata: Default::default(),
    };

    assert!(to_stored_record(&annotation, FlipPolicy::AsPixels).is_err());
}

// =============================================================================
// Read Then Write
// =============================================================================

fn read_back(image_height: f64, policy: FlipPolicy) -> Rect {
    let original = stored_record(7, 10.0, 60.0, 30.0, 40.0, None);
    let outcome = translate_batch(&[original], image_height, &NoLabels);
    let draft = to_stored_record(&outcome.annotations[0], policy).unwrap();

    // Storage-space bounding box of the written polygon
    let flipped = polygon_to_rect(draft.annotation.polygon(), image_height).unwrap();
    Rect::new(
        flipped.x,
        image_height - flipped.y - flipped.h,
        flipped.w,
        flipped.h,
    )
}

#[test]
fn test_symmetric_policy_preserves_stored_position() {
    let rect = read_back(
        100.0,
        FlipPolicy::Symmetric {
            image_height: 100.0,
        },
    );
    assert_eq!(rect, Rect::new(10.0, 60.0, 30.0, 40.0));
}

#[test]
fn test_pixel_policy_writes_pixel_position() {
    // y moves from 60 (storage) to 0 (pixel space), size is kept
    let rect = read_back(100.0, FlipPolicy::AsPixels);
    assert_eq!(rect, Rect::new(10.0, 0.0, 30.0, 40.0));
}
