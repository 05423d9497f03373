//! Snapshot cache
//!
//! Versioned taxonomy snapshots with an absolute expiry. Expiry is checked on
//! read; an expired entry is evicted by the read that finds it.

use crate::error::TaxonomyError;
use crate::model::Taxonomy;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<Taxonomy>,
    expires_at: DateTime<Utc>,
}

/// Version-keyed snapshot cache, one entry per version
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` under `version`, replacing any previous entry
    pub fn put(&self, version: impl Into<String>, snapshot: Arc<Taxonomy>, expires_at: DateTime<Utc>) {
        let version = version.into();
        debug!(version = %version, expires_at = %expires_at.to_rfc3339(), "Caching snapshot");
        self.entries
            .write()
            .insert(version, CacheEntry { snapshot, expires_at });
    }

    pub fn get(&self, version: &str) -> Result<Arc<Taxonomy>, TaxonomyError> {
        self.get_at(version, Utc::now())
    }

    /// Lookup as of `now`; an entry expiring exactly at `now` is expired
    pub fn get_at(&self, version: &str, now: DateTime<Utc>) -> Result<Arc<Taxonomy>, TaxonomyError> {
        {
            let entries = self.entries.read();
            match entries.get(version) {
                None => {
                    return Err(TaxonomyError::NotFound(format!(
                        "No cached snapshot for version {}",
                        version
                    )))
                }
                Some(entry) if entry.expires_at > now => return Ok(Arc::clone(&entry.snapshot)),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        // Re-check under the write lock; a concurrent put may have refreshed it.
        if let Some(entry) = entries.get(version) {
            if entry.expires_at > now {
                return Ok(Arc::clone(&entry.snapshot));
            }
            entries.remove(version);
            debug!(version = %version, "Evicted expired snapshot");
        }
        Err(TaxonomyError::Expired(version.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
