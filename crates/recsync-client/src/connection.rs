//! Connection lifecycle manager for the download-progress push channel.
//!
//! An explicit state machine (`Disconnected → Connecting → Connected →
//! (Disconnected | Error)`) driven by discrete events: open, close, stream
//! error, cancellation, and the backoff timer. One driver task per client
//! owns the socket and performs every store mutation, so mutations are
//! naturally serialized. `Error` and clean `Disconnected` both re-enter
//! `Connecting` after a capped-exponential backoff delay, for as long as
//! the token provider still answers with a bearer token.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use recsync_core::ConnectionStatus;
use recsync_core::ports::{BearerTokenProvider, NoticeSink};
use recsync_core::progress::{ClientIntent, ProgressEvent, ServerNotice};
use recsync_proto::codec;

use crate::backoff::ReconnectBackoff;
use crate::config::SyncConfig;
use crate::store::SharedProgressStore;
use crate::subscription::SubscriptionController;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound intents queued between the API surface and the driver.
const INTENT_BUFFER: usize = 16;

/// Collaborators injected by the embedder.
///
/// The store is constructed by the session context and shared between this
/// client (sole writer) and any consumers (readers) — no global state.
pub struct SyncClientDeps {
    pub store: SharedProgressStore,
    pub token_provider: Arc<dyn BearerTokenProvider>,
    pub notices: Arc<dyn NoticeSink>,
}

/// Live driver bookkeeping for one `connect()` invocation.
struct DriverSession {
    cancel: CancellationToken,
    intent_tx: mpsc::Sender<ClientIntent>,
    task: JoinHandle<()>,
}

struct ClientInner {
    config: SyncConfig,
    store: SharedProgressStore,
    token_provider: Arc<dyn BearerTokenProvider>,
    notices: Arc<dyn NoticeSink>,
    subscription: SubscriptionController,
    status_tx: watch::Sender<ConnectionStatus>,
    session: Mutex<Option<DriverSession>>,
}

impl ClientInner {
    fn lock_session(&self) -> MutexGuard<'_, Option<DriverSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Client for the recorder's download-progress push channel.
///
/// Cheap to clone-by-handle via [`SharedProgressStore`] and the status
/// watch channel; the client itself owns the connection lifecycle.
pub struct ProgressSyncClient {
    inner: Arc<ClientInner>,
}

impl ProgressSyncClient {
    /// Build a client around the injected collaborators.
    #[must_use]
    pub fn new(config: SyncConfig, deps: SyncClientDeps) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            inner: Arc::new(ClientInner {
                config,
                store: deps.store,
                token_provider: deps.token_provider,
                notices: deps.notices,
                subscription: SubscriptionController::new(),
                status_tx,
                session: Mutex::new(None),
            }),
        }
    }

    /// Open the push channel.
    ///
    /// No-op while already connecting or connected (or while a driver is
    /// still alive in its backoff window). Silently remains disconnected
    /// when the token provider yields no bearer token, or when the base
    /// URL cannot produce an endpoint. Must be called within a Tokio
    /// runtime.
    pub fn connect(&self) {
        let mut session = self.inner.lock_session();
        if matches!(
            self.status(),
            ConnectionStatus::Connecting | ConnectionStatus::Connected
        ) {
            return;
        }
        if let Some(existing) = session.as_ref() {
            // A driver sleeping out its backoff is still in charge
            if !existing.task.is_finished() {
                return;
            }
        }

        let Some(token) = self
            .inner
            .token_provider
            .bearer_token()
            .filter(|t| !t.is_empty())
        else {
            debug!("connect requested without bearer token; staying disconnected");
            return;
        };
        if let Err(e) = self.inner.config.endpoint_url(&token) {
            error!(error = %e, "cannot derive push channel endpoint");
            return;
        }

        self.inner
            .status_tx
            .send_replace(ConnectionStatus::Connecting);
        let cancel = CancellationToken::new();
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
        let task = tokio::spawn(run_driver(
            Arc::clone(&self.inner),
            cancel.clone(),
            intent_rx,
        ));
        *session = Some(DriverSession {
            cancel,
            intent_tx,
            task,
        });
    }

    /// Tear the channel down and clear all reconciliation state.
    ///
    /// Cancels any pending backoff timer, closes the socket (also when a
    /// connect is still in flight), and leaves the store as after an empty
    /// snapshot. Idempotent: a second call converges to the same end
    /// state. Call on consumer teardown and on session logout.
    pub async fn disconnect(&self) {
        let session = self.inner.lock_session().take();
        if let Some(session) = session {
            session.cancel.cancel();
            if let Err(e) = session.task.await {
                debug!(error = %e, "driver task did not join cleanly");
            }
        }
        self.inner.store.with_mut(|store| store.clear());
        self.inner
            .status_tx
            .send_replace(ConnectionStatus::Disconnected);
    }

    /// Change the streamer filter.
    ///
    /// `Some` scopes the stream to one streamer, `None` clears the scope.
    /// While connected the matching intent is sent immediately; in every
    /// other state the filter is only recorded, and the driver re-sends it
    /// on the next successful open.
    pub fn set_filter(&self, streamer_id: Option<String>) {
        let intent = self.inner.subscription.replace(streamer_id);
        if !self.status().is_connected() {
            return;
        }
        if let Some(session) = self.inner.lock_session().as_ref() {
            if let Err(e) = session.intent_tx.try_send(intent) {
                debug!(error = %e, "dropping filter intent; driver unavailable");
            }
        }
    }

    /// Currently desired streamer filter.
    #[must_use]
    pub fn filter(&self) -> Option<String> {
        self.inner.subscription.current()
    }

    /// Current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status_tx.borrow()
    }

    /// Subscribe to status transitions.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Handle to the reconciled views.
    #[must_use]
    pub fn store(&self) -> SharedProgressStore {
        self.inner.store.clone()
    }
}

/// Why a connected session ended.
enum SessionEnd {
    /// `disconnect()` cancelled us.
    Cancelled,
    /// The server closed the channel or the sink went away.
    Closed,
    /// The transport reported an error.
    Errored,
}

async fn run_driver(
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
    mut intent_rx: mpsc::Receiver<ClientIntent>,
) {
    let connection_id = Uuid::new_v4();
    let mut backoff = ReconnectBackoff::new(
        inner.config.base_reconnect_delay,
        inner.config.max_reconnect_delay,
    );

    loop {
        if cancel.is_cancelled() {
            return;
        }

        // Logout stops the reconnect loop; a deliberate disconnect() is
        // still expected to clear the stale views.
        let Some(token) = inner
            .token_provider
            .bearer_token()
            .filter(|t| !t.is_empty())
        else {
            debug!(%connection_id, "bearer token gone; stopping reconnects");
            inner
                .status_tx
                .send_replace(ConnectionStatus::Disconnected);
            return;
        };
        let url = match inner.config.endpoint_url(&token) {
            Ok(url) => url,
            Err(e) => {
                error!(%connection_id, error = %e, "cannot derive push channel endpoint");
                inner.status_tx.send_replace(ConnectionStatus::Error);
                return;
            }
        };

        inner
            .status_tx
            .send_replace(ConnectionStatus::Connecting);
        debug!(%connection_id, host = url.host_str().unwrap_or_default(), "opening push channel");

        let connected = tokio::select! {
            result = connect_async(url.as_str()) => Some(result),
            () = cancel.cancelled() => None,
        };
        let Some(connect_result) = connected else {
            return;
        };

        match connect_result {
            Ok((mut ws, _response)) => {
                if cancel.is_cancelled() {
                    // disconnect() raced the handshake: close the fresh
                    // socket instead of reviving a logically-dead session
                    let _ = ws.close(None).await;
                    return;
                }
                info!(%connection_id, "push channel connected");
                inner.status_tx.send_replace(ConnectionStatus::Connected);
                backoff.reset();

                match run_session(&inner, &cancel, &mut intent_rx, &mut ws, connection_id).await {
                    SessionEnd::Cancelled => {
                        let _ = ws.close(None).await;
                        return;
                    }
                    SessionEnd::Closed => {
                        inner
                            .status_tx
                            .send_replace(ConnectionStatus::Disconnected);
                    }
                    SessionEnd::Errored => {
                        inner.status_tx.send_replace(ConnectionStatus::Error);
                    }
                }
            }
            Err(e) => {
                warn!(%connection_id, error = %e, "push channel connect failed");
                inner.status_tx.send_replace(ConnectionStatus::Error);
            }
        }

        let delay = backoff.next_delay();
        debug!(%connection_id, ?delay, attempt = backoff.attempt(), "scheduling reconnect");
        tokio::select! {
            () = sleep(delay) => {}
            () = cancel.cancelled() => return,
        }
    }
}

async fn run_session(
    inner: &ClientInner,
    cancel: &CancellationToken,
    intent_rx: &mut mpsc::Receiver<ClientIntent>,
    ws: &mut WsStream,
    connection_id: Uuid,
) -> SessionEnd {
    // Re-establish the filter before anything else; the server scopes the
    // stream from the first frame after open.
    if let Some(intent) = inner.subscription.resend_intent() {
        if !send_intent(ws, &intent, connection_id).await {
            return SessionEnd::Closed;
        }
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => return SessionEnd::Cancelled,

            intent = intent_rx.recv() => {
                let Some(intent) = intent else {
                    return SessionEnd::Cancelled;
                };
                if !send_intent(ws, &intent, connection_id).await {
                    return SessionEnd::Closed;
                }
            }

            frame = ws.next() => match frame {
                Some(Ok(Message::Binary(data))) => handle_frame(inner, &data, connection_id),
                Some(Ok(Message::Ping(payload))) => {
                    // The server heartbeats and drops clients that stay silent
                    if ws.send(Message::Pong(payload)).await.is_err() {
                        return SessionEnd::Closed;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(%connection_id, "push channel closed by server");
                    return SessionEnd::Closed;
                }
                Some(Ok(_)) => {} // Text/Pong frames carry nothing for us
                Some(Err(e)) => {
                    warn!(%connection_id, error = %e, "push channel error");
                    return SessionEnd::Errored;
                }
            }
        }
    }
}

/// Encode and send one intent. Returns `false` when the channel is gone.
///
/// An intent failing schema validation is a contract bug local to that
/// send: it is logged at error level and the session continues.
async fn send_intent(ws: &mut WsStream, intent: &ClientIntent, connection_id: Uuid) -> bool {
    match codec::encode_intent(intent) {
        Ok(bytes) => {
            if let Err(e) = ws.send(Message::binary(bytes)).await {
                debug!(%connection_id, error = %e, "failed to send intent");
                return false;
            }
            true
        }
        Err(e) => {
            error!(%connection_id, error = %e, "refusing to send invalid intent");
            true
        }
    }
}

fn handle_frame(inner: &ClientInner, frame: &[u8], connection_id: Uuid) {
    match codec::decode_event(frame) {
        Ok(event) => {
            trace!(%connection_id, event = event.event_name(), "event received");
            dispatch_event(inner, event);
        }
        // A bad frame is dropped; the stream continues
        Err(e) => debug!(%connection_id, error = %e, "dropping undecodable frame"),
    }
}

/// Route one decoded event: reconciliation events into the store, the
/// surfaced-only ones out through the notice port.
fn dispatch_event(inner: &ClientInner, event: ProgressEvent) {
    match event {
        ProgressEvent::Snapshot { downloads } => {
            inner.store.with_mut(|store| store.apply_snapshot(downloads));
        }
        ProgressEvent::MetaUpdated { meta } => {
            let id = meta.download_id.clone();
            if !inner.store.with_mut(|store| store.apply_meta(meta)) {
                trace!(download_id = %id, "stale or shielded meta update ignored");
            }
        }
        ProgressEvent::MetricsUpdated { metrics } => {
            let id = metrics.download_id.clone();
            if !inner.store.with_mut(|store| store.apply_metrics(metrics)) {
                trace!(download_id = %id, "metrics for terminated download ignored");
            }
        }
        ProgressEvent::DownloadCompleted {
            ref download_id, ..
        }
        | ProgressEvent::DownloadFailed {
            ref download_id, ..
        }
        | ProgressEvent::DownloadCancelled {
            ref download_id, ..
        } => {
            inner
                .store
                .with_mut(|store| store.apply_terminal(download_id));
        }
        ProgressEvent::SegmentCompleted { segment } => {
            inner
                .notices
                .notify(ServerNotice::SegmentCompleted { segment });
        }
        ProgressEvent::DownloadRejected { rejection } => {
            inner
                .notices
                .notify(ServerNotice::DownloadRejected { rejection });
        }
        ProgressEvent::ServerError { error } => {
            warn!(code = %error.code, message = %error.message, "server reported error");
            inner.notices.notify(ServerNotice::ServerError { error });
        }
    }
}
