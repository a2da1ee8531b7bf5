//! Image addressing integration tests.
//!
//! Tests verify:
//! - Region URLs are clamped to the server-reported extent
//! - Thumbnails never ask the server to upscale
//! - One metadata fetch per image, however many callers
//! - Failed and slow fetches degrade to the fallback extent

use std::sync::Arc;
use std::time::Duration;

use palimpsest::image::{
    ExtentCache, ExtentState, ImageAddressBuilder, ImageExtent, ImageRequest, ResolvedExtent,
};

use super::test_utils::MockExtentSource;

const FOLIO: &str = "https://iiif.example.org/iiif/3/ms-12_f1r";
const MISSING: &str = "https://iiif.example.org/iiif/3/ms-12_missing";

fn builder_for(source: MockExtentSource) -> ImageAddressBuilder<MockExtentSource> {
    let cache = ExtentCache::with_fallback(source, ImageExtent::square(1000))
        .with_fetch_timeout(Duration::from_millis(200));
    ImageAddressBuilder::with_shared_cache(Arc::new(cache))
}

// =============================================================================
// Region URLs
// =============================================================================

#[tokio::test]
async fn test_region_overflowing_right_edge_is_clamped() {
    let source = MockExtentSource::new().with_image(FOLIO, ImageExtent::square(1000));
    let builder = builder_for(source);

    let url = builder
        .build_region_url(FOLIO, "xywh=pixel:950,10,100,50", 200)
        .await
        .unwrap();

    assert_eq!(url, format!("{FOLIO}/950,10,50,50/max/0/default.jpg"));
}

#[tokio::test]
async fn test_wide_region_requests_thumbnail_width() {
    let source = MockExtentSource::new().with_image(FOLIO, ImageExtent::new(4000, 6000));
    let builder = builder_for(source);

    let url = builder
        .build_region_url(FOLIO, "xywh=pixel:100,200,800,300", 200)
        .await
        .unwrap();

    assert_eq!(url, format!("{FOLIO}/100,200,800,300/200,/0/default.jpg"));
}

#[tokio::test]
async fn test_region_clamped_to_delivery_cap_not_raw_size() {
    let extent = ImageExtent {
        width: 8000,
        height: 6000,
        max_width: 2000,
        max_height: 1500,
    };
    let source = MockExtentSource::new().with_image(FOLIO, extent);
    let builder = builder_for(source);

    let url = builder
        .build_region_url(FOLIO, "xywh=pixel:1900,1400,500,500", 200)
        .await
        .unwrap();

    assert_eq!(url, format!("{FOLIO}/1900,1400,100,100/max/0/default.jpg"));
}

#[tokio::test]
async fn test_region_origin_outside_image_is_pulled_inside() {
    let source = MockExtentSource::new().with_image(FOLIO, ImageExtent::square(1000));
    let builder = builder_for(source);

    let url = builder
        .build_region_url(FOLIO, "xywh=pixel:1500,-20,30,30", 200)
        .await
        .unwrap();

    assert_eq!(url, format!("{FOLIO}/999,0,1,30/max/0/default.jpg"));
}

#[tokio::test]
async fn test_malformed_selector_is_an_error_and_fetches_nothing() {
    let source = MockExtentSource::new().with_image(FOLIO, ImageExtent::square(1000));
    let handle = source.clone();
    let builder = builder_for(source);

    for value in ["xywh=pixel:1,2,3", "xywh=percent:1,2,3,4", "xywh=pixel:1,2,3,4e2"] {
        assert!(builder.build_region_url(FOLIO, value, 200).await.is_err());
    }

    assert_eq!(handle.total_fetches(), 0);
    assert!(builder.cache().is_empty().await);
}

// =============================================================================
// Scaled URLs
// =============================================================================

#[tokio::test]
async fn test_scaled_url_never_upscales() {
    let source = MockExtentSource::new().with_image(FOLIO, ImageExtent::new(4000, 3000));
    let builder = builder_for(source);

    assert_eq!(
        builder.build_scaled_url(FOLIO, 0.25).await,
        format!("{FOLIO}/full/1000,/0/default.jpg")
    );
    assert_eq!(
        builder.build_scaled_url(FOLIO, 1.0).await,
        format!("{FOLIO}/full/max/0/default.jpg")
    );
    assert_eq!(
        builder.build_scaled_url(FOLIO, 3.5).await,
        format!("{FOLIO}/full/max/0/default.jpg")
    );
}

#[tokio::test]
async fn test_full_url_accepts_info_document_url() {
    let builder = builder_for(MockExtentSource::new());
    let request = ImageRequest {
        region: "square".to_string(),
        size: "!200,200".to_string(),
        ..ImageRequest::default()
    };

    assert_eq!(
        builder.build_full_url(&format!("{FOLIO}/info.json"), &request),
        format!("{FOLIO}/square/!200,200/0/default.jpg")
    );
}

// =============================================================================
// Metadata Fetching
// =============================================================================

#[tokio::test]
async fn test_concurrent_callers_share_one_fetch() {
    let source = MockExtentSource::new()
        .with_image(FOLIO, ImageExtent::new(4000, 3000))
        .with_delay(Duration::from_millis(30));
    let handle = source.clone();
    let builder = Arc::new(builder_for(source));

    let mut tasks = Vec::new();
    for i in 0..16 {
        let builder = Arc::clone(&builder);
        tasks.push(tokio::spawn(async move {
            // Mix spellings of the same image
            let base = match i % 3 {
                0 => FOLIO.to_string(),
                1 => format!("{FOLIO}/"),
                _ => format!("{FOLIO}/info.json"),
            };
            builder
                .build_region_url(&base, "xywh=pixel:0,0,400,400", 200)
                .await
                .unwrap()
        }));
    }

    for task in tasks {
        let url = task.await.unwrap();
        assert_eq!(url, format!("{FOLIO}/0,0,400,400/200,/0/default.jpg"));
    }

    assert_eq!(handle.fetch_count(FOLIO), 1);
    assert_eq!(handle.total_fetches(), 1);
}

#[tokio::test]
async fn test_missing_image_degrades_to_fallback_without_retry() {
    let source = MockExtentSource::new();
    let handle = source.clone();
    let builder = builder_for(source);

    let url = builder
        .build_region_url(MISSING, "xywh=pixel:950,10,100,50", 200)
        .await
        .unwrap();
    assert_eq!(url, format!("{MISSING}/950,10,50,50/max/0/default.jpg"));

    let resolved = builder.extent(MISSING).await;
    assert_eq!(resolved, ResolvedExtent::Degraded(ImageExtent::square(1000)));
    assert_eq!(
        builder.cache().state(MISSING).await,
        ExtentState::Degraded(ImageExtent::square(1000))
    );
    assert_eq!(handle.fetch_count(MISSING), 1);
}

#[tokio::test]
async fn test_slow_server_times_out_to_fallback() {
    let source = MockExtentSource::new()
        .with_image(FOLIO, ImageExtent::new(4000, 3000))
        .with_delay(Duration::from_secs(5));
    let builder = builder_for(source);

    let resolved = builder.extent(FOLIO).await;
    assert!(resolved.is_degraded());
    assert_eq!(resolved.extent(), ImageExtent::square(1000));
}

#[tokio::test]
async fn test_images_are_cached_independently() {
    let source = MockExtentSource::new()
        .with_image(FOLIO, ImageExtent::new(4000, 3000))
        .with_image(MISSING.replace("missing", "f1v"), ImageExtent::new(3900, 2900));
    let handle = source.clone();
    let builder = builder_for(source);

    let recto = builder.extent(FOLIO).await;
    let verso = builder.extent(&MISSING.replace("missing", "f1v")).await;

    assert_eq!(recto, ResolvedExtent::Ready(ImageExtent::new(4000, 3000)));
    assert_eq!(verso, ResolvedExtent::Ready(ImageExtent::new(3900, 2900)));
    assert_eq!(builder.cache().len().await, 2);
    assert_eq!(handle.total_fetches(), 2);

    builder.cache().reset().await;
    assert_eq!(builder.cache().state(FOLIO).await, ExtentState::Uninitialized);
    builder.extent(FOLIO).await;
    assert_eq!(handle.fetch_count(FOLIO), 2);
}

#[tokio::test]
async fn test_identifier_spellings_share_or_split_entries() {
    let spaced = "https://iiif.example.org/iiif/2/Cod.%20Sang.%20914";
    let nested = "https://iiif.example.org/iiif/3/folder%2Fimg.jp2";
    let source = MockExtentSource::new()
        .with_image(spaced, ImageExtent::square(1000))
        .with_image(nested, ImageExtent::square(1000));
    let handle = source.clone();
    let builder = builder_for(source);

    // Same identifier, encoded or not
    let url = builder
        .build_region_url(
            "https://iiif.example.org/iiif/2/Cod. Sang. 914",
            "xywh=pixel:0,0,10,10",
            200,
        )
        .await
        .unwrap();
    assert_eq!(url, format!("{spaced}/0,0,10,10/max/0/default.jpg"));
    builder.extent(spaced).await;
    assert_eq!(handle.fetch_count(spaced), 1);

    // An encoded slash names a different resource than a path separator
    assert!(!builder.extent(nested).await.is_degraded());
    assert!(builder
        .extent("https://iiif.example.org/iiif/3/folder/img.jp2")
        .await
        .is_degraded());
    assert_eq!(handle.fetch_count(nested), 1);
    assert_eq!(builder.cache().len().await, 3);
}
