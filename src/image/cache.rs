//! Per-image extent cache with single-flight fetching.
//!
//! Each distinct (normalized) base URI gets one entry that moves through:
//!
//! ```text
//! Uninitialized ──first get()──▶ Fetching ──┬──▶ Ready(extent)
//!                                            └──▶ Degraded(fallback)
//! ```
//!
//! - Exactly one fetch is issued per base URI. Concurrent callers wait on the
//!   same in-flight result.
//! - The fetch runs on its own task. A caller that goes away mid-flight only
//!   drops its wait; the entry still settles and later callers reuse it.
//! - Settled entries are never mutated. `Degraded` is terminal: there is no
//!   automatic retry.
//! - A failed or timed-out fetch is logged, never returned as an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::MetadataError;

use super::address::normalize_base_uri;
use super::extent::ImageExtent;
use super::source::ExtentSource;

/// A settled cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedExtent {
    /// Extent reported by the image server
    Ready(ImageExtent),
    /// Fallback extent after a failed fetch
    Degraded(ImageExtent),
}

impl ResolvedExtent {
    pub fn extent(&self) -> ImageExtent {
        match *self {
            ResolvedExtent::Ready(extent) | ResolvedExtent::Degraded(extent) => extent,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ResolvedExtent::Degraded(_))
    }
}

/// Observable lifecycle state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentState {
    Uninitialized,
    Fetching,
    Ready(ImageExtent),
    Degraded(ImageExtent),
}

impl From<ResolvedExtent> for ExtentState {
    fn from(resolved: ResolvedExtent) -> Self {
        match resolved {
            ResolvedExtent::Ready(extent) => ExtentState::Ready(extent),
            ResolvedExtent::Degraded(extent) => ExtentState::Degraded(extent),
        }
    }
}

type Slot = watch::Receiver<Option<ResolvedExtent>>;

/// Cache of image extents keyed by normalized base URI.
///
/// One instance is meant to live for the whole process and be shared via
/// `Arc`; entries are created lazily on first use.
pub struct ExtentCache<S: ExtentSource + 'static> {
    /// Where extents come from
    source: Arc<S>,

    /// One slot per base URI; the value is `None` while fetching
    entries: Mutex<HashMap<String, Slot>>,

    /// Extent used for degraded entries
    fallback: ImageExtent,

    /// Upper bound on a single fetch
    fetch_timeout: Option<Duration>,
}

impl<S: ExtentSource + 'static> ExtentCache<S> {
    /// Create a cache with the default square fallback and no timeout.
    pub fn new(source: S) -> Self {
        Self::with_fallback(source, ImageExtent::default())
    }

    /// Create a cache with a custom fallback extent.
    pub fn with_fallback(source: S, fallback: ImageExtent) -> Self {
        Self {
            source: Arc::new(source),
            entries: Mutex::new(HashMap::new()),
            fallback,
            fetch_timeout: None,
        }
    }

    /// Bound every fetch by `timeout`; expiry degrades the entry.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// The extent used for degraded entries.
    pub fn fallback(&self) -> ImageExtent {
        self.fallback
    }

    /// The underlying metadata source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the extent for `base_uri`, fetching it on first use.
    ///
    /// Never fails: a failed fetch yields [`ResolvedExtent::Degraded`].
    pub async fn get(&self, base_uri: &str) -> ResolvedExtent {
        let key = normalize_base_uri(base_uri);

        let mut slot = {
            let mut entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(slot) => slot.clone(),
                None => {
                    // We're the first caller for this image
                    let (tx, rx) = watch::channel(None);
                    entries.insert(key.clone(), rx.clone());
                    self.spawn_fetch(key.clone(), tx);
                    rx
                }
            }
        };

        let settled = match slot.wait_for(Option::is_some).await {
            Ok(value) => *value,
            // Fetch task ended without publishing
            Err(_) => None,
        };

        match settled {
            Some(resolved) => {
                debug!(base_uri = %key, degraded = resolved.is_degraded(), "Extent resolved");
                resolved
            }
            None => ResolvedExtent::Degraded(self.fallback),
        }
    }

    /// Current state of the entry for `base_uri`, without fetching.
    pub async fn state(&self, base_uri: &str) -> ExtentState {
        let key = normalize_base_uri(base_uri);
        let entries = self.entries.lock().await;

        let Some(slot) = entries.get(&key) else {
            return ExtentState::Uninitialized;
        };

        let current = *slot.borrow();
        match current {
            Some(resolved) => resolved.into(),
            None if slot.has_changed().is_err() => ExtentState::Degraded(self.fallback),
            None => ExtentState::Fetching,
        }
    }

    /// Number of entries, settled or in flight.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if no image has been requested yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drop every entry.
    ///
    /// Test isolation hook; settled entries are otherwise kept for the
    /// lifetime of the cache.
    pub async fn reset(&self) {
        self.entries.lock().await.clear();
    }

    fn spawn_fetch(&self, key: String, tx: watch::Sender<Option<ResolvedExtent>>) {
        let source = Arc::clone(&self.source);
        let fallback = self.fallback;
        let timeout = self.fetch_timeout;

        tokio::spawn(async move {
            debug!(base_uri = %key, "Fetching image extent");

            let resolved = match fetch_with_timeout(source.as_ref(), &key, timeout).await {
                Ok(extent) => {
                    info!(
                        base_uri = %key,
                        width = extent.width,
                        height = extent.height,
                        max_width = extent.max_width,
                        max_height = extent.max_height,
                        "Image extent ready"
                    );
                    ResolvedExtent::Ready(extent)
                }
                Err(error) => {
                    warn!(
                        base_uri = %key,
                        %error,
                        fallback_width = fallback.width,
                        fallback_height = fallback.height,
                        "Metadata fetch failed, using fallback extent"
                    );
                    ResolvedExtent::Degraded(fallback)
                }
            };

            // No receivers left only after reset(); nothing to publish to
            let _ = tx.send(Some(resolved));
        });
    }
}

async fn fetch_with_timeout<S: ExtentSource + ?Sized>(
    source: &S,
    base_uri: &str,
    timeout: Option<Duration>,
) -> Result<ImageExtent, MetadataError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch_extent(base_uri))
            .await
            .map_err(|_| MetadataError::Timeout {
                millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })?,
        None => source.fetch_extent(base_uri).await,
    }
}
