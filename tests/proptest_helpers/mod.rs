#![allow(dead_code)]

use palimpsest::geometry::{Bounds, Rect};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(256);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Coordinates as they come out of an editor: mostly in range, sometimes
/// negative or past the edge, often fractional.
pub fn arb_coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => -500.0f64..5000.0,
        1 => (-500i32..5000).prop_map(f64::from),
        1 => Just(0.0),
    ]
}

pub fn arb_rect() -> impl Strategy<Value = Rect> {
    (
        arb_coordinate(),
        arb_coordinate(),
        arb_coordinate(),
        arb_coordinate(),
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

pub fn arb_bounds() -> impl Strategy<Value = Bounds> {
    (1u32..4000, 1u32..4000).prop_map(|(w, h)| Bounds::new(w, h))
}

/// Finite rectangles with non-negative size.
pub fn arb_finite_rect() -> impl Strategy<Value = Rect> {
    (
        -1e6f64..1e6,
        -1e6f64..1e6,
        0.0f64..1e6,
        0.0f64..1e6,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}
