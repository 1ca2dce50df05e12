//! Inbound domain events, outbound client intents, and surfaced notices.
//!
//! `ProgressEvent` is the tagged union the codec produces from server
//! frames; the connection driver routes each variant either into the
//! reconciliation store or out through the notice port.

use serde::{Deserialize, Serialize};

use super::types::{DownloadMeta, DownloadMetrics, DownloadState};

/// A completed recording segment. Informational only — never mutates
/// per-download state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentProgress {
    pub download_id: String,
    pub streamer_id: String,
    pub session_id: String,
    pub segment_path: String,
    pub segment_index: u32,
    pub duration_secs: f64,
    pub size_bytes: u64,
}

/// A download request the server refused before assigning a download id.
///
/// Fire-and-forget: carries no `download_id` and is never joined into the
/// view model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadRejection {
    pub streamer_id: String,
    pub session_id: String,
    pub reason: String,
    /// Suggested wait before retrying; `0` when the server gave none.
    pub retry_after_secs: u64,
    pub recoverable: bool,
}

/// An error the server reported in-band on the push channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerErrorInfo {
    pub code: String,
    pub message: String,
}

/// Single discriminated union for everything the server pushes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Full replacement of all currently active downloads, sent once per
    /// connection at open.
    Snapshot { downloads: Vec<DownloadState> },

    /// Low-frequency attributes changed for one download.
    MetaUpdated { meta: DownloadMeta },

    /// High-frequency counters changed for one download.
    MetricsUpdated { metrics: DownloadMetrics },

    /// A recording segment finished. Informational.
    SegmentCompleted { segment: SegmentProgress },

    /// Terminal: the download finished successfully.
    DownloadCompleted {
        download_id: String,
        streamer_id: String,
        session_id: String,
        total_bytes: u64,
        total_duration_secs: f64,
        total_segments: u32,
    },

    /// Terminal: the download failed.
    DownloadFailed {
        download_id: String,
        streamer_id: String,
        session_id: String,
        error: String,
        recoverable: bool,
    },

    /// Terminal: the download was cancelled.
    DownloadCancelled {
        download_id: String,
        streamer_id: String,
        session_id: String,
        cause: String,
    },

    /// The server refused to start a download.
    DownloadRejected { rejection: DownloadRejection },

    /// In-band server error.
    ServerError { error: ServerErrorInfo },
}

impl ProgressEvent {
    /// The download ID this event targets, when it targets one.
    #[must_use]
    pub fn download_id(&self) -> Option<&str> {
        match self {
            Self::Snapshot { .. } | Self::DownloadRejected { .. } | Self::ServerError { .. } => {
                None
            }
            Self::MetaUpdated { meta } => Some(&meta.download_id),
            Self::MetricsUpdated { metrics } => Some(&metrics.download_id),
            Self::SegmentCompleted { segment } => Some(&segment.download_id),
            Self::DownloadCompleted { download_id, .. }
            | Self::DownloadFailed { download_id, .. }
            | Self::DownloadCancelled { download_id, .. } => Some(download_id),
        }
    }

    /// Stable event name for log fields and adapter channels.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "progress:snapshot",
            Self::MetaUpdated { .. } => "progress:meta",
            Self::MetricsUpdated { .. } => "progress:metrics",
            Self::SegmentCompleted { .. } => "progress:segment_completed",
            Self::DownloadCompleted { .. } => "progress:completed",
            Self::DownloadFailed { .. } => "progress:failed",
            Self::DownloadCancelled { .. } => "progress:cancelled",
            Self::DownloadRejected { .. } => "progress:rejected",
            Self::ServerError { .. } => "progress:server_error",
        }
    }

    /// Whether this variant removes the download from the live set.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DownloadCompleted { .. }
                | Self::DownloadFailed { .. }
                | Self::DownloadCancelled { .. }
        )
    }
}

/// What the client asks of the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientIntent {
    /// Scope the stream to one streamer's downloads.
    Subscribe { streamer_id: String },
    /// Drop the filter and receive everything again.
    Unsubscribe,
}

/// Events surfaced to the consumer layer without touching the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerNotice {
    SegmentCompleted { segment: SegmentProgress },
    DownloadRejected { rejection: DownloadRejection },
    ServerError { error: ServerErrorInfo },
}
