//! Server notice port.
//!
//! This port abstracts delivery of the events that are surfaced to the
//! consumer layer without mutating the store (`SegmentCompleted`,
//! `DownloadRejected`, `ServerError`), keeping the connection driver
//! decoupled from transport details (channels, Tauri events, SSE).

use crate::progress::ServerNotice;

/// Port for delivering surfaced server notices.
///
/// Implementations must not block; the connection driver calls this inline
/// between frames.
pub trait NoticeSink: Send + Sync {
    /// Deliver one notice.
    fn notify(&self, notice: ServerNotice);

    /// Clone this sink into a boxed trait object.
    fn clone_box(&self) -> Box<dyn NoticeSink>;
}

/// A no-op sink for tests and embeddings that ignore notices.
#[derive(Debug, Clone, Default)]
pub struct NoopNoticeSink;

impl NoopNoticeSink {
    /// Create a new no-op sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NoticeSink for NoopNoticeSink {
    fn notify(&self, _notice: ServerNotice) {
        // Intentionally do nothing
    }

    fn clone_box(&self) -> Box<dyn NoticeSink> {
        Box::new(self.clone())
    }
}
