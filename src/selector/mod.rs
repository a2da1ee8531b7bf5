//! Fragment selector values.
//!
//! The annotation editor addresses regions with W3C media-fragment selectors
//! of the exact form:
//!
//! ```text
//! xywh=pixel:<x>,<y>,<w>,<h>
//! ```
//!
//! Components are plain decimal numbers (`12`, `12.5`, `-3`), comma-separated,
//! with no whitespace. Persisted selectors are read by other systems, so the
//! output of [`format`] must stay byte-compatible with that grammar.
//!
//! No rounding happens here; values are rounded only when a region is
//! clamped for an image request.

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;
use crate::geometry::Rect;

/// Literal prefix of every selector value.
pub const SELECTOR_PREFIX: &str = "xywh=pixel:";

/// Specification the selector conforms to.
pub const MEDIA_FRAGMENTS_URI: &str = "http://www.w3.org/TR/media-frags/";

/// A W3C `FragmentSelector` as exchanged with the annotation editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSelector {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "conformsTo", default = "default_conforms_to")]
    pub conforms_to: String,

    pub value: String,
}

impl FragmentSelector {
    /// Wraps an already formatted selector value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            kind: "FragmentSelector".to_string(),
            conforms_to: MEDIA_FRAGMENTS_URI.to_string(),
            value: value.into(),
        }
    }

    /// Formats `rect` into a selector.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(format(rect))
    }

    /// Parses the selector value.
    pub fn to_rect(&self) -> Result<Rect, SelectorError> {
        parse(&self.value)
    }
}

fn default_conforms_to() -> String {
    MEDIA_FRAGMENTS_URI.to_string()
}

/// Parses `xywh=pixel:<x>,<y>,<w>,<h>` into a pixel-space rectangle.
pub fn parse(value: &str) -> Result<Rect, SelectorError> {
    let body = value
        .strip_prefix(SELECTOR_PREFIX)
        .ok_or_else(|| SelectorError::MissingPrefix {
            value: value.to_string(),
        })?;

    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() != 4 {
        return Err(SelectorError::ComponentCount { found: parts.len() });
    }

    let x = parse_component(parts[0])?;
    let y = parse_component(parts[1])?;
    let w = parse_component(parts[2])?;
    let h = parse_component(parts[3])?;

    Ok(Rect::new(x, y, w, h))
}

/// Serializes a rectangle with the same grammar [`parse`] accepts.
///
/// Values are written in their shortest exact decimal form; integral values
/// carry no fractional part (`10`, not `10.0`). Rectangles are expected to be
/// finite.
pub fn format(rect: Rect) -> String {
    format!(
        "{}{},{},{},{}",
        SELECTOR_PREFIX,
        number(rect.x),
        number(rect.y),
        number(rect.w),
        number(rect.h)
    )
}

fn number(value: f64) -> f64 {
    // "-0" is not part of the selector grammar
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Accepts `-?digits(.digits)?` and nothing else.
fn parse_component(component: &str) -> Result<f64, SelectorError> {
    let invalid = || SelectorError::InvalidNumber {
        component: component.to_string(),
    };

    let unsigned = component.strip_prefix('-').unwrap_or(component);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return Err(invalid());
    }

    component.parse::<f64>().map_err(|_| invalid())
}
