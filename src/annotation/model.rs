//! Wire shapes for stored and viewer annotations.

use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;
use crate::selector::FragmentSelector;

/// GeoJSON `"type": "Feature"` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

/// GeoJSON `"type": "Polygon"` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeometryType {
    #[default]
    Polygon,
}

/// GeoJSON polygon geometry, coordinates in storage space (Y-up).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub coordinates: Polygon,
}

/// GeoJSON feature wrapping a polygon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: PolygonGeometry,
}

impl Feature {
    pub fn from_polygon(coordinates: Polygon) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry: PolygonGeometry {
                kind: GeometryType::Polygon,
                coordinates,
            },
        }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.geometry.coordinates
    }
}

/// An annotation record as returned by the annotation storage API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnnotation {
    pub id: i64,
    pub annotation: Feature,
    #[serde(default)]
    pub allograph: Option<i64>,
    #[serde(default)]
    pub hand: Option<i64>,
}

/// A record ready to be submitted back to the storage API.
///
/// `id` is `None` for annotations that were never persisted (create) and
/// `Some` for edits of persisted ones (update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecordDraft {
    pub id: Option<i64>,
    pub annotation: Feature,
    pub allograph: Option<i64>,
    pub hand: Option<i64>,
}

/// Palaeographic metadata carried alongside a viewer annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotationMetadata {
    #[serde(rename = "allographId", default)]
    pub allograph_id: Option<i64>,
    #[serde(rename = "handId", default)]
    pub hand_id: Option<i64>,
}

/// A free-text body attached to an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextualBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub purpose: String,
    pub value: String,
}

impl TextualBody {
    /// A `commenting` body holding a label.
    pub fn commenting(value: impl Into<String>) -> Self {
        Self {
            kind: "TextualBody".to_string(),
            purpose: "commenting".to_string(),
            value: value.into(),
        }
    }
}

/// The annotation editor's in-memory representation.
///
/// `id` is `"db:<n>"` for persisted records and an opaque client id otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerAnnotation {
    pub id: String,
    pub selector: FragmentSelector,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<TextualBody>,
    #[serde(default)]
    pub metadata: AnnotationMetadata,
}

impl ViewerAnnotation {
    /// Returns the label of the first body, if any.
    pub fn label(&self) -> Option<&str> {
        self.body.first().map(|body| body.value.as_str())
    }
}
