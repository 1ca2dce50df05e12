#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod connection;
pub mod ports;
pub mod progress;

// Re-export commonly used types for convenience
pub use connection::ConnectionStatus;
pub use ports::{BearerTokenProvider, NoopNoticeSink, NoticeSink, StaticTokenProvider};
pub use progress::{
    ClientIntent, DownloadMeta, DownloadMetrics, DownloadRejection, DownloadState, DownloadView,
    ProgressEvent, ProgressStore, SegmentProgress, ServerErrorInfo, ServerNotice,
};
