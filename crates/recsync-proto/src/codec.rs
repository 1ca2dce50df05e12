//! Frame codec: wire envelopes to domain events, intents to wire frames.
//!
//! Decoding never panics and never crosses the caller's async boundary
//! with an error: a bad frame yields a [`DecodeError`] the caller logs and
//! drops, and the stream continues. Encoding validates the intent first —
//! a validation failure is a programmer error, fatal to that send only.

use prost::Message;
use thiserror::Error;

use recsync_core::progress::{
    ClientIntent, DownloadMeta, DownloadMetrics, DownloadRejection, DownloadState, ProgressEvent,
    SegmentProgress, ServerErrorInfo,
};

use crate::wire;

/// A frame that is not a well-formed instance of the wire schema.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes do not decode as an envelope at all.
    #[error("malformed frame: {0}")]
    Malformed(#[from] prost::DecodeError),
    /// The envelope decoded but carries no recognizable payload — absent,
    /// or from a schema revision this client does not know.
    #[error("envelope without recognizable payload (event_type {event_type})")]
    MissingPayload { event_type: i32 },
}

/// An outgoing intent that fails schema validation.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// `Subscribe` requires a streamer id.
    #[error("subscribe intent requires a non-empty streamer_id")]
    EmptyStreamerId,
}

/// Decode one binary frame into a domain event.
///
/// The payload oneof determines the variant; the envelope's numeric
/// `event_type` is carried only for diagnostics.
pub fn decode_event(frame: &[u8]) -> Result<ProgressEvent, DecodeError> {
    let envelope = wire::WsMessage::decode(frame)?;
    let Some(payload) = envelope.payload else {
        return Err(DecodeError::MissingPayload {
            event_type: envelope.event_type,
        });
    };

    Ok(match payload {
        wire::ws_message::Payload::Snapshot(snapshot) => ProgressEvent::Snapshot {
            downloads: snapshot.downloads.into_iter().map(state_from_wire).collect(),
        },
        wire::ws_message::Payload::Meta(meta) => ProgressEvent::MetaUpdated {
            meta: meta_from_wire(meta),
        },
        wire::ws_message::Payload::Metrics(metrics) => ProgressEvent::MetricsUpdated {
            metrics: metrics_from_wire(metrics),
        },
        wire::ws_message::Payload::SegmentCompleted(segment) => ProgressEvent::SegmentCompleted {
            segment: SegmentProgress {
                download_id: segment.download_id,
                streamer_id: segment.streamer_id,
                session_id: segment.session_id,
                segment_path: segment.segment_path,
                segment_index: segment.segment_index,
                duration_secs: segment.duration_secs,
                size_bytes: segment.size_bytes,
            },
        },
        wire::ws_message::Payload::DownloadCompleted(done) => ProgressEvent::DownloadCompleted {
            download_id: done.download_id,
            streamer_id: done.streamer_id,
            session_id: done.session_id,
            total_bytes: done.total_bytes,
            total_duration_secs: done.total_duration_secs,
            total_segments: done.total_segments,
        },
        wire::ws_message::Payload::DownloadFailed(failed) => ProgressEvent::DownloadFailed {
            download_id: failed.download_id,
            streamer_id: failed.streamer_id,
            session_id: failed.session_id,
            error: failed.error,
            recoverable: failed.recoverable,
        },
        wire::ws_message::Payload::DownloadCancelled(cancelled) => {
            ProgressEvent::DownloadCancelled {
                download_id: cancelled.download_id,
                streamer_id: cancelled.streamer_id,
                session_id: cancelled.session_id,
                cause: cancelled.cause,
            }
        }
        wire::ws_message::Payload::DownloadRejected(rejected) => ProgressEvent::DownloadRejected {
            rejection: DownloadRejection {
                streamer_id: rejected.streamer_id,
                session_id: rejected.session_id,
                reason: rejected.reason,
                retry_after_secs: rejected.retry_after_secs,
                recoverable: rejected.recoverable,
            },
        },
        wire::ws_message::Payload::Error(error) => ProgressEvent::ServerError {
            error: ServerErrorInfo {
                code: error.code,
                message: error.message,
            },
        },
    })
}

/// Encode one client intent into a binary frame.
pub fn encode_intent(intent: &ClientIntent) -> Result<Vec<u8>, EncodeError> {
    let action = match intent {
        ClientIntent::Subscribe { streamer_id } => {
            if streamer_id.is_empty() {
                return Err(EncodeError::EmptyStreamerId);
            }
            wire::client_message::Action::Subscribe(wire::SubscribeRequest {
                streamer_id: streamer_id.clone(),
            })
        }
        ClientIntent::Unsubscribe => {
            wire::client_message::Action::Unsubscribe(wire::UnsubscribeRequest {})
        }
    };

    let message = wire::ClientMessage {
        action: Some(action),
    };
    Ok(message.encode_to_vec())
}

fn meta_from_wire(meta: wire::DownloadMeta) -> DownloadMeta {
    DownloadMeta {
        download_id: meta.download_id,
        streamer_id: meta.streamer_id,
        session_id: meta.session_id,
        engine_type: meta.engine_type,
        started_at_ms: meta.started_at_ms,
        updated_at_ms: meta.updated_at_ms,
        cdn_host: meta.cdn_host,
        download_url: meta.download_url,
    }
}

fn metrics_from_wire(metrics: wire::DownloadMetrics) -> DownloadMetrics {
    DownloadMetrics {
        download_id: metrics.download_id,
        status: metrics.status,
        bytes_downloaded: metrics.bytes_downloaded,
        duration_secs: metrics.duration_secs,
        speed_bytes_per_sec: metrics.speed_bytes_per_sec,
        segments_completed: metrics.segments_completed,
        media_duration_secs: metrics.media_duration_secs,
        playback_ratio: metrics.playback_ratio,
    }
}

fn state_from_wire(state: wire::DownloadState) -> DownloadState {
    DownloadState {
        meta: state.meta.map(meta_from_wire).unwrap_or_default(),
        metrics: state.metrics.map(metrics_from_wire).unwrap_or_default(),
    }
}
