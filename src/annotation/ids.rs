//! Identity bookkeeping for viewer annotations.
//!
//! Persisted annotations are identified in the viewer as `"db:<n>"`, where
//! `n` is the storage id. The `"db:"` prefix is reserved: unsaved annotations
//! get client ids from [`ClientIdGenerator`], which can never produce it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Reserved prefix marking persisted annotations.
pub const PERSISTED_PREFIX: &str = "db:";

/// Default prefix for client-generated ids.
pub const DEFAULT_CLIENT_PREFIX: &str = "tmp-";

/// Builds the viewer id of a persisted record.
pub fn persisted_viewer_id(storage_id: i64) -> String {
    format!("{PERSISTED_PREFIX}{storage_id}")
}

/// Returns true if `id` carries the reserved prefix.
pub fn is_persisted_id(id: &str) -> bool {
    id.starts_with(PERSISTED_PREFIX)
}

/// Extracts the storage id from a persisted viewer id.
///
/// Returns `None` for unsaved ids and for suffixes that are not a complete
/// integer (`"db:12abc"` is not `12`). A leading `-` is accepted so every id
/// from [`persisted_viewer_id`] parses back.
pub fn parse_persisted_id(id: &str) -> Option<i64> {
    let suffix = id.strip_prefix(PERSISTED_PREFIX)?;
    let digits = suffix.strip_prefix('-').unwrap_or(suffix);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Issues ids for annotations that have not been saved yet.
#[derive(Debug)]
pub struct ClientIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl ClientIdGenerator {
    /// Creates a generator issuing `tmp-1`, `tmp-2`, ...
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_CLIENT_PREFIX.to_string(),
            next: AtomicU64::new(1),
        }
    }

    /// Creates a generator with a custom prefix.
    ///
    /// Returns `None` if the prefix would yield reserved ids.
    pub fn with_prefix(prefix: impl Into<String>) -> Option<Self> {
        let prefix = prefix.into();
        if prefix.starts_with(PERSISTED_PREFIX) {
            return None;
        }
        Some(Self {
            prefix,
            next: AtomicU64::new(1),
        })
    }

    /// Returns the next unused id.
    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

impl Default for ClientIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
