//! Taxonomy Store
//!
//! Shared handle over one taxonomy version. Readers take the read lock for the
//! duration of a lookup or page; only the mutation pipeline takes the write lock.

use crate::error::TaxonomyError;
use crate::model::{Taxonomy, TaxonomyRecord};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct TaxonomyStore {
    inner: RwLock<Taxonomy>,
}

impl TaxonomyStore {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            inner: RwLock::new(taxonomy),
        }
    }

    /// Shared view of the collections
    pub fn read(&self) -> RwLockReadGuard<'_, Taxonomy> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Taxonomy> {
        self.inner.write()
    }

    pub fn version(&self) -> String {
        self.inner.read().version.clone()
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> Taxonomy {
        self.inner.read().clone()
    }

    /// Exact-match lookup by tooling symbol, cloned out of the lock
    pub fn get<T: TaxonomyRecord>(&self, tooling: &str) -> Result<T, TaxonomyError> {
        self.inner.read().get::<T>(tooling).cloned()
    }
}
