//! Reconciliation store for the download telemetry stream.
//!
//! This module provides a pure state machine merging the two
//! independently-arriving update streams (slow-changing meta,
//! fast-changing metrics) into one joined view per download id.
//! No I/O is performed here; the connection driver handles transport.
//!
//! # Design
//!
//! - Pure synchronous state machine (no async, no IO, no locking) — the
//!   caller is responsible for synchronization
//! - One arena entry per download id holding `{meta, metrics}` plus the
//!   precomputed view; the view is recomputed inside every mutation, so
//!   readers never observe a half-merged join
//! - Stale or illegal updates are silently ignored, never errors: late
//!   and reordered delivery is the steady state of the push channel
//!
//! # Ordering
//!
//! Meta carries a best-effort `updated_at_ms` stamp. A versioned record
//! never regresses to an older or unversioned one. Metrics carry no stamp;
//! the latest record received wins.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::types::{DownloadMeta, DownloadMetrics, DownloadState, DownloadView};

/// One arena slot: both record halves and their precomputed join.
#[derive(Clone, Debug, Default)]
struct ProgressEntry {
    meta: Option<DownloadMeta>,
    metrics: Option<DownloadMetrics>,
    view: DownloadView,
}

impl ProgressEntry {
    fn recompute(&mut self) {
        self.view = DownloadView::joined(self.meta.as_ref(), self.metrics.as_ref());
    }
}

/// In-memory keyed state merging meta and metrics streams per download.
///
/// Entries are created implicitly by the first meta or metrics event for
/// an id (the missing half is defaulted so joins never fail), destroyed by
/// a terminal event, or replaced wholesale by the next snapshot. Ids that
/// received a terminal event are shielded from further updates until a
/// snapshot clears the terminated set.
#[derive(Debug, Default)]
pub struct ProgressStore {
    entries: IndexMap<String, ProgressEntry>,
    terminated: HashSet<String>,
    version: u64,
}

impl ProgressStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic change counter; bumps on every accepted mutation so
    /// consumers can detect "something changed" without deep comparison.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Number of live (non-terminated) downloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no live download is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the id received a terminal event since the last snapshot.
    #[must_use]
    pub fn is_terminated(&self, download_id: &str) -> bool {
        self.terminated.contains(download_id)
    }

    /// Replace all state with the server's full snapshot.
    ///
    /// Unconditionally clears every entry and the terminated set, then
    /// inserts each pair without ordering checks — a fresh connection's
    /// snapshot supersedes everything that came before it. Entries whose
    /// halves both lack a download id are skipped.
    pub fn apply_snapshot(&mut self, downloads: Vec<DownloadState>) {
        self.entries.clear();
        self.terminated.clear();

        for state in downloads {
            let id = state.download_id().to_string();
            if id.is_empty() {
                continue;
            }
            let mut entry = ProgressEntry {
                meta: Some(state.meta),
                metrics: Some(state.metrics),
                view: DownloadView::default(),
            };
            entry.recompute();
            self.entries.insert(id, entry);
        }

        self.version += 1;
    }

    /// Merge a meta update. Returns `true` when the update was accepted.
    ///
    /// Ignored when the id is terminated, when a versioned record would be
    /// overwritten by an older one, or when an unversioned update
    /// (`updated_at_ms == 0`) arrives over a versioned record. An accepted
    /// update never zeroes an already-set start stamp.
    pub fn apply_meta(&mut self, mut meta: DownloadMeta) -> bool {
        if meta.download_id.is_empty() || self.terminated.contains(&meta.download_id) {
            return false;
        }

        let entry = self.entries.entry(meta.download_id.clone()).or_default();
        if let Some(existing) = &entry.meta {
            if existing.updated_at_ms != 0 {
                if meta.updated_at_ms == 0 {
                    return false;
                }
                if meta.updated_at_ms < existing.updated_at_ms {
                    return false;
                }
            }
            if meta.started_at_ms == 0 {
                meta.started_at_ms = existing.started_at_ms;
            }
        }

        entry.meta = Some(meta);
        entry.recompute();
        self.version += 1;
        true
    }

    /// Merge a metrics update. Returns `true` when the update was accepted.
    ///
    /// Metrics carry no ordering token: the latest record received wins,
    /// wholesale. Ignored only for terminated ids.
    pub fn apply_metrics(&mut self, metrics: DownloadMetrics) -> bool {
        if metrics.download_id.is_empty() || self.terminated.contains(&metrics.download_id) {
            return false;
        }

        let entry = self.entries.entry(metrics.download_id.clone()).or_default();
        entry.metrics = Some(metrics);
        entry.recompute();
        self.version += 1;
        true
    }

    /// Mark an id terminated and evict its records and view.
    ///
    /// Membership in the terminated set is sticky until the next snapshot;
    /// late meta/metrics for the id are ignored from here on. Returns
    /// `false` when the id was already terminated.
    pub fn apply_terminal(&mut self, download_id: &str) -> bool {
        if download_id.is_empty() || !self.terminated.insert(download_id.to_string()) {
            return false;
        }

        self.entries.shift_remove(download_id);
        self.version += 1;
        true
    }

    /// Drop all state, equivalent to applying an empty snapshot.
    ///
    /// Used on deliberate disconnect. No-op (and no version bump) when the
    /// store is already empty, so repeated disconnects converge.
    pub fn clear(&mut self) {
        if self.entries.is_empty() && self.terminated.is_empty() {
            return;
        }
        self.entries.clear();
        self.terminated.clear();
        self.version += 1;
    }

    /// View for one download id, if it is live.
    #[must_use]
    pub fn view(&self, download_id: &str) -> Option<&DownloadView> {
        self.entries.get(download_id).map(|e| &e.view)
    }

    /// All live views, in insertion order.
    pub fn views(&self) -> impl Iterator<Item = &DownloadView> {
        self.entries.values().map(|e| &e.view)
    }

    /// Linear scan of the live views for one streamer.
    #[must_use]
    pub fn views_by_streamer(&self, streamer_id: &str) -> Vec<DownloadView> {
        self.entries
            .values()
            .filter(|e| e.view.streamer_id == streamer_id)
            .map(|e| e.view.clone())
            .collect()
    }

    /// Whether the streamer has at least one live download.
    #[must_use]
    pub fn has_active(&self, streamer_id: &str) -> bool {
        self.entries
            .values()
            .any(|e| e.view.streamer_id == streamer_id)
    }
}
