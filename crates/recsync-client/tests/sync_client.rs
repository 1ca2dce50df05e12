//! Lifecycle tests against a real local WebSocket server.
//!
//! Each test binds an ephemeral listener, speaks the binary wire contract
//! through `recsync_proto::wire`, and drives the client through the
//! behavior a live recorder backend would: snapshot on open, filter
//! handling, heartbeat pings, dropped connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use prost::Message as ProstMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use recsync_client::{
    ConnectionStatus, ProgressSyncClient, SharedProgressStore, SyncClientDeps, SyncConfig,
};
use recsync_core::ports::{NoopNoticeSink, StaticTokenProvider};
use recsync_proto::wire;

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn make_client(addr: SocketAddr, store: SharedProgressStore) -> ProgressSyncClient {
    let mut config = SyncConfig::new(format!("http://{addr}"));
    // Keep reconnects fast so dropped-connection tests stay snappy
    config.base_reconnect_delay = Duration::from_millis(50);
    config.max_reconnect_delay = Duration::from_millis(200);
    ProgressSyncClient::new(
        config,
        SyncClientDeps {
            store,
            token_provider: Arc::new(StaticTokenProvider::new("test-jwt")),
            notices: Arc::new(NoopNoticeSink::new()),
        },
    )
}

async fn accept_ws(listener: &TcpListener) -> Result<WebSocketStream<TcpStream>> {
    let (stream, _) = listener.accept().await?;
    Ok(accept_async(stream).await?)
}

async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        sleep(Duration::from_millis(20)).await;
    }
    false
}

fn snapshot_frame(entries: &[(&str, &str)]) -> Message {
    let downloads = entries
        .iter()
        .map(|(download_id, streamer_id)| wire::DownloadState {
            meta: Some(wire::DownloadMeta {
                download_id: (*download_id).to_string(),
                streamer_id: (*streamer_id).to_string(),
                ..Default::default()
            }),
            metrics: Some(wire::DownloadMetrics {
                download_id: (*download_id).to_string(),
                status: "Starting".to_string(),
                ..Default::default()
            }),
        })
        .collect();

    let msg = wire::WsMessage {
        event_type: wire::EventType::Snapshot as i32,
        payload: Some(wire::ws_message::Payload::Snapshot(wire::DownloadSnapshot {
            downloads,
        })),
    };
    Message::binary(msg.encode_to_vec())
}

fn metrics_frame(download_id: &str, status: &str, bytes: u64) -> Message {
    let msg = wire::WsMessage {
        event_type: wire::EventType::MetricsUpdated as i32,
        payload: Some(wire::ws_message::Payload::Metrics(wire::DownloadMetrics {
            download_id: download_id.to_string(),
            status: status.to_string(),
            bytes_downloaded: bytes,
            ..Default::default()
        })),
    };
    Message::binary(msg.encode_to_vec())
}

/// Decode a client frame into the subscribe filter it carries
/// (`Some(streamer_id)` for subscribe, `None` for unsubscribe).
fn decode_filter(data: &[u8]) -> Option<Option<String>> {
    let msg = wire::ClientMessage::decode(data).ok()?;
    match msg.action? {
        wire::client_message::Action::Subscribe(req) => Some(Some(req.streamer_id)),
        wire::client_message::Action::Unsubscribe(_) => Some(None),
    }
}

#[tokio::test]
async fn snapshot_populates_store_and_disconnect_clears() -> Result<()> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws.send(snapshot_frame(&[("d1", "s1")])).await;
            let _ = ws.send(metrics_frame("d1", "Downloading", 4096)).await;
            // Hold the connection open until the client goes away
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    let store = SharedProgressStore::new();
    let client = make_client(addr, store.clone());
    client.connect();

    assert!(wait_until(|| client.status() == ConnectionStatus::Connected).await);
    assert!(
        wait_until(|| store.view("d1").is_some_and(|v| v.status == "Downloading")).await,
        "snapshot and metrics never reconciled"
    );

    let views = store.views_by_streamer("s1");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].download_id, "d1");
    assert_eq!(views[0].bytes_downloaded, 4096);
    assert!(store.has_active("s1"));

    client.disconnect().await;
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert!(store.is_empty());

    // Disconnect twice: same end state, no duplicate side effects
    let version = store.version();
    client.disconnect().await;
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert_eq!(store.version(), version);
    Ok(())
}

#[tokio::test]
async fn filter_is_resent_on_open_and_sent_on_change() -> Result<()> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (filters_tx, mut filters_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws.send(snapshot_frame(&[])).await;
            while let Some(Ok(frame)) = ws.next().await {
                if let Message::Binary(data) = frame {
                    if let Some(filter) = decode_filter(&data) {
                        let _ = filters_tx.send(filter);
                    }
                }
            }
        }
    });

    let client = make_client(addr, SharedProgressStore::new());
    // Filter chosen while disconnected is only recorded...
    client.set_filter(Some("s1".to_string()));
    client.connect();

    // ...and re-sent by the driver as the first frame after open
    let first = tokio::time::timeout(WAIT, filters_rx.recv()).await?;
    assert_eq!(first, Some(Some("s1".to_string())));

    assert!(wait_until(|| client.status() == ConnectionStatus::Connected).await);
    client.set_filter(Some("s2".to_string()));
    let second = tokio::time::timeout(WAIT, filters_rx.recv()).await?;
    assert_eq!(second, Some(Some("s2".to_string())));

    client.set_filter(None);
    let third = tokio::time::timeout(WAIT, filters_rx.recv()).await?;
    assert_eq!(third, Some(None));

    client.disconnect().await;
    Ok(())
}

#[tokio::test]
async fn server_ping_is_answered_with_pong() -> Result<()> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws.send(Message::Ping("hb".as_bytes().into())).await;
            while let Some(Ok(frame)) = ws.next().await {
                if let Message::Pong(payload) = frame {
                    let _ = pong_tx.send(payload);
                }
            }
        }
    });

    let client = make_client(addr, SharedProgressStore::new());
    client.connect();

    let payload = tokio::time::timeout(WAIT, pong_rx.recv())
        .await?
        .expect("server task ended without a pong");
    assert_eq!(payload.as_ref(), b"hb");

    client.disconnect().await;
    Ok(())
}

#[tokio::test]
async fn reconnects_after_drop_and_fresh_snapshot_supersedes() -> Result<()> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        // First connection: snapshot with d1, then drop the socket
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws.send(snapshot_frame(&[("d1", "s1")])).await;
            let _ = ws.close(None).await;
        }
        // Second connection (after backoff): a superseding snapshot
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws.send(snapshot_frame(&[("d2", "s1")])).await;
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    let store = SharedProgressStore::new();
    let client = make_client(addr, store.clone());
    client.connect();

    assert!(wait_until(|| store.view("d1").is_some()).await);
    assert!(
        wait_until(|| store.view("d2").is_some() && store.view("d1").is_none()).await,
        "reconnect snapshot never replaced the previous state"
    );
    assert_eq!(client.status(), ConnectionStatus::Connected);

    client.disconnect().await;
    Ok(())
}

#[tokio::test]
async fn undecodable_frame_is_dropped_and_stream_continues() -> Result<()> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws
                .send(Message::binary(vec![0xff, 0xff, 0xff, 0x01]))
                .await;
            let _ = ws.send(metrics_frame("d1", "Downloading", 1000)).await;
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    let store = SharedProgressStore::new();
    let client = make_client(addr, store.clone());
    client.connect();

    assert!(
        wait_until(|| store.view("d1").is_some()).await,
        "stream did not survive the malformed frame"
    );
    assert_eq!(client.status(), ConnectionStatus::Connected);

    client.disconnect().await;
    Ok(())
}

#[tokio::test]
async fn terminal_event_evicts_until_next_snapshot() -> Result<()> {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Ok(mut ws) = accept_ws(&listener).await {
            let _ = ws.send(snapshot_frame(&[("d2", "s2")])).await;
            let failed = wire::WsMessage {
                event_type: wire::EventType::DownloadFailed as i32,
                payload: Some(wire::ws_message::Payload::DownloadFailed(
                    wire::DownloadFailed {
                        download_id: "d2".to_string(),
                        streamer_id: "s2".to_string(),
                        session_id: String::new(),
                        error: "connection timeout".to_string(),
                        recoverable: true,
                    },
                )),
            };
            let _ = ws.send(Message::binary(failed.encode_to_vec())).await;
            // Late metrics for the terminated id must be shielded
            let _ = ws.send(metrics_frame("d2", "Downloading", 9999)).await;
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    let store = SharedProgressStore::new();
    let client = make_client(addr, store.clone());
    client.connect();

    assert!(wait_until(|| store.has_active("s2")).await);
    assert!(
        wait_until(|| !store.has_active("s2") && store.is_terminated("d2")).await,
        "terminal event never evicted the download"
    );

    // Give the late metrics frame time to arrive; it must stay shielded
    sleep(Duration::from_millis(200)).await;
    assert!(store.view("d2").is_none());

    client.disconnect().await;
    Ok(())
}
