//! Hand-maintained mirror of the server's `download_progress` protobuf
//! package.
//!
//! Message and field names follow the server schema; tags are part of the
//! wire contract and must only change in lockstep with the server. The
//! envelope carries a numeric [`EventType`] plus exactly one populated
//! payload; an envelope whose payload is absent (or from a newer, unknown
//! schema revision) is rejected by the codec, not silently accepted.

/// Server → client event tag carried alongside the payload oneof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    Unspecified = 0,
    Snapshot = 1,
    MetaUpdated = 2,
    MetricsUpdated = 3,
    SegmentCompleted = 4,
    DownloadCompleted = 5,
    DownloadFailed = 6,
    DownloadCancelled = 7,
    DownloadRejected = 8,
    Error = 9,
}

/// Low-frequency download attributes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadMeta {
    #[prost(string, tag = "1")]
    pub download_id: String,
    #[prost(string, tag = "2")]
    pub streamer_id: String,
    #[prost(string, tag = "3")]
    pub session_id: String,
    #[prost(string, tag = "4")]
    pub engine_type: String,
    #[prost(int64, tag = "5")]
    pub started_at_ms: i64,
    #[prost(int64, tag = "6")]
    pub updated_at_ms: i64,
    #[prost(string, tag = "7")]
    pub cdn_host: String,
    #[prost(string, tag = "8")]
    pub download_url: String,
}

/// High-frequency download counters.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadMetrics {
    #[prost(string, tag = "1")]
    pub download_id: String,
    #[prost(string, tag = "2")]
    pub status: String,
    #[prost(uint64, tag = "3")]
    pub bytes_downloaded: u64,
    #[prost(double, tag = "4")]
    pub duration_secs: f64,
    #[prost(uint64, tag = "5")]
    pub speed_bytes_per_sec: u64,
    #[prost(uint32, tag = "6")]
    pub segments_completed: u32,
    #[prost(double, tag = "7")]
    pub media_duration_secs: f64,
    #[prost(double, tag = "8")]
    pub playback_ratio: f64,
}

/// One snapshot entry: a meta/metrics pair for a single download.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadState {
    #[prost(message, optional, tag = "1")]
    pub meta: Option<DownloadMeta>,
    #[prost(message, optional, tag = "2")]
    pub metrics: Option<DownloadMetrics>,
}

/// Full replacement set of active downloads, sent once per connection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadSnapshot {
    #[prost(message, repeated, tag = "1")]
    pub downloads: Vec<DownloadState>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmentCompleted {
    #[prost(string, tag = "1")]
    pub download_id: String,
    #[prost(string, tag = "2")]
    pub streamer_id: String,
    #[prost(string, tag = "3")]
    pub session_id: String,
    #[prost(string, tag = "4")]
    pub segment_path: String,
    #[prost(uint32, tag = "5")]
    pub segment_index: u32,
    #[prost(double, tag = "6")]
    pub duration_secs: f64,
    #[prost(uint64, tag = "7")]
    pub size_bytes: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadCompleted {
    #[prost(string, tag = "1")]
    pub download_id: String,
    #[prost(string, tag = "2")]
    pub streamer_id: String,
    #[prost(string, tag = "3")]
    pub session_id: String,
    #[prost(uint64, tag = "4")]
    pub total_bytes: u64,
    #[prost(double, tag = "5")]
    pub total_duration_secs: f64,
    #[prost(uint32, tag = "6")]
    pub total_segments: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadFailed {
    #[prost(string, tag = "1")]
    pub download_id: String,
    #[prost(string, tag = "2")]
    pub streamer_id: String,
    #[prost(string, tag = "3")]
    pub session_id: String,
    #[prost(string, tag = "4")]
    pub error: String,
    #[prost(bool, tag = "5")]
    pub recoverable: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadCancelled {
    #[prost(string, tag = "1")]
    pub download_id: String,
    #[prost(string, tag = "2")]
    pub streamer_id: String,
    #[prost(string, tag = "3")]
    pub session_id: String,
    #[prost(string, tag = "4")]
    pub cause: String,
}

/// Emitted before a `download_id` is assigned; never joined into views.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadRejected {
    #[prost(string, tag = "1")]
    pub streamer_id: String,
    #[prost(string, tag = "2")]
    pub session_id: String,
    #[prost(string, tag = "3")]
    pub reason: String,
    #[prost(uint64, tag = "4")]
    pub retry_after_secs: u64,
    #[prost(bool, tag = "5")]
    pub recoverable: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorPayload {
    #[prost(string, tag = "1")]
    pub code: String,
    #[prost(string, tag = "2")]
    pub message: String,
}

/// Server → client envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WsMessage {
    #[prost(enumeration = "EventType", tag = "1")]
    pub event_type: i32,
    #[prost(oneof = "ws_message::Payload", tags = "2, 3, 4, 5, 6, 7, 8, 9, 10")]
    pub payload: Option<ws_message::Payload>,
}

pub mod ws_message {
    /// Exactly one payload per envelope.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        Snapshot(super::DownloadSnapshot),
        #[prost(message, tag = "3")]
        Meta(super::DownloadMeta),
        #[prost(message, tag = "4")]
        Metrics(super::DownloadMetrics),
        #[prost(message, tag = "5")]
        SegmentCompleted(super::SegmentCompleted),
        #[prost(message, tag = "6")]
        DownloadCompleted(super::DownloadCompleted),
        #[prost(message, tag = "7")]
        DownloadFailed(super::DownloadFailed),
        #[prost(message, tag = "8")]
        DownloadCancelled(super::DownloadCancelled),
        #[prost(message, tag = "9")]
        DownloadRejected(super::DownloadRejected),
        #[prost(message, tag = "10")]
        Error(super::ErrorPayload),
    }
}

/// Scope the stream to one streamer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeRequest {
    #[prost(string, tag = "1")]
    pub streamer_id: String,
}

/// Drop the streamer filter.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UnsubscribeRequest {}

/// Client → server envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientMessage {
    #[prost(oneof = "client_message::Action", tags = "1, 2")]
    pub action: Option<client_message::Action>,
}

pub mod client_message {
    /// Exactly one action per message.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Action {
        #[prost(message, tag = "1")]
        Subscribe(super::SubscribeRequest),
        #[prost(message, tag = "2")]
        Unsubscribe(super::UnsubscribeRequest),
    }
}
