//! Progress record types: the meta/metrics split and their joined view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Low-frequency attributes of a download.
///
/// Meta changes rarely after the download starts (engine selection, CDN
/// reassignment). `updated_at_ms` is a best-effort version stamp for meta
/// only; `0` means "unversioned".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadMeta {
    /// Unique across the lifetime of one download attempt.
    pub download_id: String,
    pub streamer_id: String,
    pub session_id: String,
    /// Engine identifier, e.g. "ffmpeg" or "mesio".
    pub engine_type: String,
    /// Epoch milliseconds; immutable once set non-zero.
    pub started_at_ms: i64,
    /// Version stamp for meta ordering; `0` = unversioned.
    pub updated_at_ms: i64,
    pub cdn_host: String,
    pub download_url: String,
}

impl DownloadMeta {
    /// Start time as a UTC timestamp, `None` while unset.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        (self.started_at_ms != 0)
            .then(|| DateTime::from_timestamp_millis(self.started_at_ms))
            .flatten()
    }
}

/// High-frequency attributes of a download.
///
/// Metrics arrive continuously while a download runs and carry no ordering
/// token; the latest record received always wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadMetrics {
    pub download_id: String,
    /// Free-form status string, e.g. "Starting" or "Downloading".
    pub status: String,
    pub bytes_downloaded: u64,
    pub duration_secs: f64,
    pub speed_bytes_per_sec: u64,
    pub segments_completed: u32,
    pub media_duration_secs: f64,
    /// Expected in 0.0–1.0, not enforced.
    pub playback_ratio: f64,
}

/// A `{meta, metrics}` pair — the snapshot entry shape.
///
/// Either half may be defaulted when the server did not populate it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadState {
    pub meta: DownloadMeta,
    pub metrics: DownloadMetrics,
}

impl DownloadState {
    /// The identifying key for this entry: the meta id when present,
    /// otherwise the metrics id. Empty when neither half carries one.
    #[must_use]
    pub fn download_id(&self) -> &str {
        if self.meta.download_id.is_empty() {
            &self.metrics.download_id
        } else {
            &self.meta.download_id
        }
    }
}

/// Read-only union of the meta and metrics fields for one download id.
///
/// Consumers render views directly; every store mutation recomputes the
/// affected view atomically, so no half-merged state is ever observable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadView {
    pub download_id: String,
    pub streamer_id: String,
    pub session_id: String,
    pub engine_type: String,
    pub started_at_ms: i64,
    pub updated_at_ms: i64,
    pub cdn_host: String,
    pub download_url: String,
    pub status: String,
    pub bytes_downloaded: u64,
    pub duration_secs: f64,
    pub speed_bytes_per_sec: u64,
    pub segments_completed: u32,
    pub media_duration_secs: f64,
    pub playback_ratio: f64,
}

impl DownloadView {
    /// Join the two halves of a record into one view.
    ///
    /// The view's `download_id` comes from meta whenever a meta record is
    /// present, else from metrics. A missing half contributes defaults.
    #[must_use]
    pub fn joined(meta: Option<&DownloadMeta>, metrics: Option<&DownloadMetrics>) -> Self {
        let m = meta.cloned().unwrap_or_default();
        let x = metrics.cloned().unwrap_or_default();
        let download_id = if meta.is_some() {
            m.download_id
        } else {
            x.download_id.clone()
        };

        Self {
            download_id,
            streamer_id: m.streamer_id,
            session_id: m.session_id,
            engine_type: m.engine_type,
            started_at_ms: m.started_at_ms,
            updated_at_ms: m.updated_at_ms,
            cdn_host: m.cdn_host,
            download_url: m.download_url,
            status: x.status,
            bytes_downloaded: x.bytes_downloaded,
            duration_secs: x.duration_secs,
            speed_bytes_per_sec: x.speed_bytes_per_sec,
            segments_completed: x.segments_completed,
            media_duration_secs: x.media_duration_secs,
            playback_ratio: x.playback_ratio,
        }
    }

    /// Start time as a UTC timestamp, `None` while unset.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        (self.started_at_ms != 0)
            .then(|| DateTime::from_timestamp_millis(self.started_at_ms))
            .flatten()
    }

    /// Meta version stamp as a UTC timestamp, `None` when unversioned.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        (self.updated_at_ms != 0)
            .then(|| DateTime::from_timestamp_millis(self.updated_at_ms))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_id_prefers_meta() {
        let meta = DownloadMeta {
            download_id: "meta-id".to_string(),
            ..Default::default()
        };
        let metrics = DownloadMetrics {
            download_id: "metrics-id".to_string(),
            ..Default::default()
        };

        let view = DownloadView::joined(Some(&meta), Some(&metrics));
        assert_eq!(view.download_id, "meta-id");

        let view = DownloadView::joined(None, Some(&metrics));
        assert_eq!(view.download_id, "metrics-id");
    }

    #[test]
    fn test_state_key_falls_back_to_metrics() {
        let state = DownloadState {
            metrics: DownloadMetrics {
                download_id: "d1".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(state.download_id(), "d1");
    }

    #[test]
    fn test_started_at_zero_is_none() {
        let meta = DownloadMeta::default();
        assert!(meta.started_at().is_none());

        let meta = DownloadMeta {
            started_at_ms: 1_700_000_000_000,
            ..Default::default()
        };
        assert!(meta.started_at().is_some());
    }
}
