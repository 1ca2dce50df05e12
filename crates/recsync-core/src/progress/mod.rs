//! Download progress domain: records, events, intents, and the store.
//!
//! This module contains pure data types and the reconciliation state
//! machine for the download telemetry stream. No I/O, networking, or
//! runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - the meta/metrics record split and the joined view
//! - `events` - inbound domain events, outbound intents, surfaced notices
//! - `store` - the reconciliation store merging the two update streams

pub mod events;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use events::{
    ClientIntent, DownloadRejection, ProgressEvent, SegmentProgress, ServerErrorInfo, ServerNotice,
};
pub use store::ProgressStore;
pub use types::{DownloadMeta, DownloadMetrics, DownloadState, DownloadView};
