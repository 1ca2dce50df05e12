//! Shared handle around the reconciliation store.
//!
//! The store itself is a pure state machine (`recsync_core`); this handle
//! adds the sharing discipline: the embedder constructs one, clones it
//! into the sync client and any consumers, and only the connection driver
//! mutates it. Consumers see the read-only query surface plus the version
//! counter.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use recsync_core::progress::{DownloadView, ProgressStore};

/// Clonable, read-guarded handle to a [`ProgressStore`].
///
/// Locks are held only for the duration of one query or one mutation,
/// never across awaits.
#[derive(Clone, Debug, Default)]
pub struct SharedProgressStore {
    inner: Arc<RwLock<ProgressStore>>,
}

impl SharedProgressStore {
    /// Handle around an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic change counter; see [`ProgressStore::version`].
    #[must_use]
    pub fn version(&self) -> u64 {
        self.read().version()
    }

    /// Number of live downloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no live download is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// View for one download id, cloned out of the store.
    #[must_use]
    pub fn view(&self, download_id: &str) -> Option<DownloadView> {
        self.read().view(download_id).cloned()
    }

    /// All live views in insertion order.
    #[must_use]
    pub fn views(&self) -> Vec<DownloadView> {
        self.read().views().cloned().collect()
    }

    /// Live views for one streamer.
    #[must_use]
    pub fn views_by_streamer(&self, streamer_id: &str) -> Vec<DownloadView> {
        self.read().views_by_streamer(streamer_id)
    }

    /// Whether the streamer has at least one live download.
    #[must_use]
    pub fn has_active(&self, streamer_id: &str) -> bool {
        self.read().has_active(streamer_id)
    }

    /// Whether the id was terminated since the last snapshot.
    #[must_use]
    pub fn is_terminated(&self, download_id: &str) -> bool {
        self.read().is_terminated(download_id)
    }

    /// Run one mutation against the store. Crate-internal: all writes
    /// happen on the connection driver (or in `disconnect`), one at a
    /// time.
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut ProgressStore) -> R) -> R {
        f(&mut self.write())
    }

    fn read(&self) -> RwLockReadGuard<'_, ProgressStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProgressStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
