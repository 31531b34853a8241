#![allow(missing_docs)]
//! Realtime trade session over STOMP/WebSocket.
//!
//! A [`Session`] owns one WebSocket connection to the realtime feed. After
//! [`connect`](Session::connect) succeeds, a background Tokio task reads frames
//! in arrival order, answers heartbeats, confirms subscriptions, and calls the
//! trade handler for every MESSAGE.
//!
//! # Example
//!
//! ```no_run
//! use tossinvest_rs::client::TossClient;
//! use tossinvest_rs::ws::session::{Session, SessionConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> tossinvest_rs::error::Result<()> {
//! let session = Session::new(SessionConfig::default(), |trade| {
//!     println!("{} {} @ {}", trade.code, trade.volume, trade.close);
//! });
//! session.connect_with(&TossClient::new()?).await?;
//!
//! // Returns once the server has acknowledged the subscription.
//! session.subscribe("US20220225003").await?;
//!
//! let reason = session.closed().await;
//! println!("session ended: {reason:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! `subscribe`, `unsubscribe`, and `close` take `&self`, so a session can be
//! shared behind an `Arc`. Subscribe/unsubscribe requests are serialized: one
//! request lock is held from sending the frame until the request completes.
//! The registry has its own short-lived lock that the receive loop takes for
//! each receipt, so a caller waiting for confirmation never blocks the loop.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::client::TossClient;
use crate::constants::{HEARTBEAT, STOMP_SUBPROTOCOLS, WS_REALTIME_URL, defaults};
use crate::error::{Result, TossError};
use crate::types::credentials::{CredentialProvider, Credentials};
use crate::types::trade::TradeEvent;
use crate::ws::frame::{self, InboundFrame};
use crate::ws::registry::{Registry, SubscriptionId, SubscriptionState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WriterHalf = SplitSink<WsStream, Message>;
type ReaderHalf = SplitStream<WsStream>;

/// Callback invoked on the receive loop for every trade.
///
/// Runs inline with frame processing: a slow handler delays every frame
/// behind it, receipts included.
pub type TradeHandler = Arc<dyn Fn(TradeEvent) + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Why a session reached [`SessionState::Closed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// [`Session::close`] was called.
    Requested,
    /// The server sent a close frame or the stream ended.
    ServerClosed,
    /// The WebSocket failed.
    Transport(String),
    /// The server did not confirm CONNECT.
    HandshakeFailed(String),
    /// A MESSAGE body could not be decoded.
    MalformedPayload(String),
}

/// Lifecycle of a [`Session`].
///
/// ```text
/// Created ──connect()──▶ Connecting ──CONNECTED──▶ Ready
///    │                       │                       │
///    └───────────────────────┴───────────────────────┴──▶ Closed(reason)
/// ```
///
/// `Closed` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Connecting,
    Ready,
    Closed(CloseReason),
}

impl SessionState {
    /// Whether moving from `self` to `next` is a valid transition.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Created, Connecting)
                | (Connecting, Ready)
                | (Created, Closed(_))
                | (Connecting, Closed(_))
                | (Ready, Closed(_))
        )
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::Closed(_))
    }

    pub fn close_reason(&self) -> Option<&CloseReason> {
        match self {
            SessionState::Closed(reason) => Some(reason),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket endpoint.
    pub url: String,
    /// Sub-protocols offered during the upgrade, most preferred first.
    pub subprotocols: Vec<String>,
    /// `(send, receive)` heartbeat intervals advertised in CONNECT (ms).
    pub heartbeat_ms: (u64, u64),
    /// Maximum wait for CONNECTED.
    pub handshake_timeout: Duration,
    /// Maximum wait for a subscribe RECEIPT.
    pub subscribe_timeout: Duration,
    /// Pause after UNSUBSCRIBE before the next request may be sent.
    pub unsubscribe_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: WS_REALTIME_URL.to_owned(),
            subprotocols: STOMP_SUBPROTOCOLS.iter().map(|p| (*p).to_owned()).collect(),
            heartbeat_ms: (defaults::HEARTBEAT_MS, defaults::HEARTBEAT_MS),
            handshake_timeout: Duration::from_millis(defaults::HANDSHAKE_TIMEOUT_MS),
            subscribe_timeout: Duration::from_millis(defaults::SUBSCRIBE_TIMEOUT_MS),
            unsubscribe_settle: Duration::from_millis(defaults::UNSUBSCRIBE_SETTLE_MS),
        }
    }
}

/// Builder for constructing a [`Session`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use tossinvest_rs::ws::session::SessionBuilder;
///
/// let session = SessionBuilder::new(|trade| println!("{trade:?}"))
///     .subscribe_timeout(Duration::from_secs(5))
///     .unsubscribe_settle(Duration::from_millis(100))
///     .build();
/// ```
pub struct SessionBuilder {
    handler: TradeHandler,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Create a new builder delivering trades to `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(TradeEvent) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            config: SessionConfig::default(),
        }
    }

    /// Set the WebSocket endpoint. Default: [`WS_REALTIME_URL`].
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Replace the offered sub-protocols. Default: `v12.stomp, v11.stomp, v10.stomp`.
    pub fn subprotocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.subprotocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Set the advertised heartbeat intervals in milliseconds. Default: 5,000 / 5,000.
    pub fn heartbeat_ms(mut self, send: u64, recv: u64) -> Self {
        self.config.heartbeat_ms = (send, recv);
        self
    }

    /// Set the CONNECTED wait limit. Default: 10 s.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Set the subscribe RECEIPT wait limit. Default: 10 s.
    pub fn subscribe_timeout(mut self, timeout: Duration) -> Self {
        self.config.subscribe_timeout = timeout;
        self
    }

    /// Set the post-UNSUBSCRIBE pause. Default: 400 ms.
    pub fn unsubscribe_settle(mut self, delay: Duration) -> Self {
        self.config.unsubscribe_settle = delay;
        self
    }

    /// Build the [`Session`].
    pub fn build(self) -> Session {
        Session::with_handler(self.config, self.handler)
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State touched by both the caller side and the receive loop.
struct Shared {
    state: watch::Sender<SessionState>,
    /// Held only for individual registry reads/writes.
    registry: parking_lot::Mutex<Registry>,
    /// Signalled after every subscribe receipt and on shutdown.
    receipts: Notify,
    /// `None` once the connection is torn down.
    writer: Mutex<Option<WriterHalf>>,
}

impl Shared {
    fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Apply `next` if the transition is valid. Returns whether it was applied.
    fn transition(&self, next: SessionState) -> bool {
        self.state.send_if_modified(|current| {
            if current.can_transition_to(&next) {
                tracing::debug!(from = ?current, to = ?next, "Session state transition");
                *current = next;
                true
            } else {
                false
            }
        })
    }

    async fn send(&self, text: String) -> Result<()> {
        let mut guard = self.writer.lock().await;
        match guard.as_mut() {
            Some(w) => {
                w.send(Message::Text(text.into())).await?;
                Ok(())
            }
            None => Err(TossError::SessionClosed),
        }
    }

    /// Release `stream_key` only if it still holds `id`.
    fn release_if_current(&self, stream_key: &str, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        registry.id_of(stream_key) == Some(id) && registry.release(stream_key).is_ok()
    }

    /// Tear down after the receive loop exits on its own.
    async fn shutdown(&self, reason: CloseReason) {
        self.writer.lock().await.take();
        if self.transition(SessionState::Closed(reason.clone())) {
            tracing::info!(reason = ?reason, "Realtime session closed");
        }
        self.receipts.notify_waiters();
    }
}

/// An allocated subscription whose receipt has not been seen yet.
///
/// Dropped while armed, it releases the registry entry and sends
/// UNSUBSCRIBE for the id from a spawned task.
struct PendingSubscribe {
    shared: Arc<Shared>,
    stream_key: String,
    id: SubscriptionId,
    armed: bool,
}

impl PendingSubscribe {
    fn new(shared: &Arc<Shared>, stream_key: &str, id: SubscriptionId) -> Self {
        Self {
            shared: Arc::clone(shared),
            stream_key: stream_key.to_owned(),
            id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }

    /// Release the entry and unsubscribe before returning.
    async fn roll_back(mut self) {
        self.armed = false;
        if !self.shared.release_if_current(&self.stream_key, self.id) {
            return;
        }
        let unsubscribe = frame::build_unsubscribe(&self.stream_key, self.id);
        if let Err(e) = self.shared.send(unsubscribe).await {
            tracing::warn!(
                stream_key = %self.stream_key,
                id = %self.id,
                error = %e,
                "Failed to roll back subscription"
            );
        }
    }
}

impl Drop for PendingSubscribe {
    fn drop(&mut self) {
        if !self.armed || !self.shared.release_if_current(&self.stream_key, self.id) {
            return;
        }
        tracing::debug!(stream_key = %self.stream_key, id = %self.id, "Subscribe cancelled");

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        let unsubscribe = frame::build_unsubscribe(&self.stream_key, self.id);
        runtime.spawn(async move {
            let _ = shared.send(unsubscribe).await;
        });
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single STOMP session on the realtime trade feed.
///
/// Use [`SessionBuilder`] for ergonomic construction.
pub struct Session {
    config: SessionConfig,
    handler: TradeHandler,
    shared: Arc<Shared>,
    /// Serializes subscribe/unsubscribe, held across send-and-wait.
    request_lock: Mutex<()>,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session in the [`Created`](SessionState::Created) state.
    ///
    /// `handler` is called on the receive loop for every trade.
    pub fn new<F>(config: SessionConfig, handler: F) -> Self
    where
        F: Fn(TradeEvent) + Send + Sync + 'static,
    {
        Self::with_handler(config, Arc::new(handler))
    }

    /// Create a session with an already shared handler.
    pub fn with_handler(config: SessionConfig, handler: TradeHandler) -> Self {
        let (state, _) = watch::channel(SessionState::Created);
        Self {
            config,
            handler,
            shared: Arc::new(Shared {
                state,
                registry: parking_lot::Mutex::new(Registry::new()),
                receipts: Notify::new(),
                writer: Mutex::new(None),
            }),
            request_lock: Mutex::new(()),
            task: parking_lot::Mutex::new(None),
        }
    }

    /// Fetch credentials from `provider`, then [`connect`](Self::connect).
    pub async fn connect_with<P: CredentialProvider>(&self, provider: &P) -> Result<()> {
        let credentials = provider.credentials().await?;
        self.connect(&credentials).await
    }

    /// Open the WebSocket, perform the STOMP handshake, and start the
    /// receive loop.
    ///
    /// Returns once CONNECTED has been received. A failed connect leaves the
    /// session [`Closed`](SessionState::Closed).
    pub async fn connect(&self, credentials: &Credentials) -> Result<()> {
        if !self.shared.transition(SessionState::Connecting) {
            return Err(match self.shared.state() {
                SessionState::Closed(_) => TossError::SessionClosed,
                _ => TossError::InvalidArgument("session already connected".into()),
            });
        }

        let (write, read) = match self.handshake(credentials).await {
            Ok(halves) => halves,
            Err(e) => {
                let reason = match &e {
                    TossError::HandshakeFailed(msg) => CloseReason::HandshakeFailed(msg.clone()),
                    other => CloseReason::Transport(other.to_string()),
                };
                self.shared.transition(SessionState::Closed(reason));
                tracing::error!(error = %e, "Realtime connect failed");
                return Err(e);
            }
        };

        *self.shared.writer.lock().await = Some(write);
        let task = tokio::spawn(receive_loop(
            read,
            Arc::clone(&self.shared),
            Arc::clone(&self.handler),
        ));
        *self.task.lock() = Some(task);

        if !self.shared.transition(SessionState::Ready) {
            // Closed while the handshake was in flight.
            if let Some(task) = self.task.lock().take() {
                task.abort();
            }
            self.shared.writer.lock().await.take();
            return Err(TossError::SessionClosed);
        }

        tracing::info!(
            connection_id = %credentials.connection_id,
            "Connected to realtime WebSocket"
        );
        Ok(())
    }

    /// Subscribe to the trade stream of `stream_key`.
    ///
    /// Resolves only after the server's RECEIPT for this subscription has
    /// been seen, or fails with [`TossError::SubscribeTimeout`] after
    /// [`SessionConfig::subscribe_timeout`].
    ///
    /// On timeout, or when the returned future is dropped before the receipt
    /// arrives, the registry entry is released and an UNSUBSCRIBE for the
    /// allocated id is sent, so the server does not keep a subscription the
    /// caller can no longer see.
    pub async fn subscribe(&self, stream_key: &str) -> Result<SubscriptionId> {
        self.ensure_ready()?;
        if stream_key.is_empty() {
            return Err(TossError::InvalidArgument("empty stream key".into()));
        }
        let _request = self.request_lock.lock().await;
        self.ensure_ready()?;

        let id = self.shared.registry.lock().allocate(stream_key)?;
        let pending = PendingSubscribe::new(&self.shared, stream_key, id);

        if let Err(e) = self.shared.send(frame::build_subscribe(stream_key, id)).await {
            pending.disarm();
            self.shared.release_if_current(stream_key, id);
            return Err(e);
        }
        tracing::debug!(stream_key, %id, "Sent SUBSCRIBE");

        match tokio::time::timeout(self.config.subscribe_timeout, self.wait_confirmed(id)).await {
            Ok(Ok(())) => {
                pending.disarm();
                tracing::info!(stream_key, %id, "Subscription confirmed");
                Ok(id)
            }
            Ok(Err(e)) => {
                pending.disarm();
                Err(e)
            }
            Err(_) => {
                tracing::warn!(stream_key, %id, "No receipt for subscription");
                pending.roll_back().await;
                Err(TossError::SubscribeTimeout {
                    stream_key: stream_key.to_owned(),
                    id,
                })
            }
        }
    }

    /// Unsubscribe from `stream_key`.
    ///
    /// The registry entry is dropped immediately; the server's receipt is not
    /// awaited. The call then pauses for [`SessionConfig::unsubscribe_settle`].
    pub async fn unsubscribe(&self, stream_key: &str) -> Result<()> {
        self.ensure_ready()?;
        let _request = self.request_lock.lock().await;
        self.ensure_ready()?;

        let id = self.shared.registry.lock().release(stream_key)?;
        self.shared
            .send(frame::build_unsubscribe(stream_key, id))
            .await?;
        tracing::debug!(stream_key, %id, "Sent UNSUBSCRIBE");

        tokio::time::sleep(self.config.unsubscribe_settle).await;
        Ok(())
    }

    /// Close the connection and stop the receive loop.
    ///
    /// Every later operation, including another `close`, fails with
    /// [`TossError::SessionClosed`].
    pub async fn close(&self) -> Result<()> {
        if !self
            .shared
            .transition(SessionState::Closed(CloseReason::Requested))
        {
            return Err(TossError::SessionClosed);
        }

        let task = self.task.lock().take();
        if let Some(task) = task {
            task.abort();
        }

        let writer = self.shared.writer.lock().await.take();
        if let Some(mut w) = writer {
            let _ = w.send(Message::Close(None)).await;
        }
        self.shared.receipts.notify_waiters();

        tracing::info!("Realtime session closed by caller");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Receiver observing every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Wait until the session is closed and return why.
    pub async fn closed(&self) -> CloseReason {
        let mut rx = self.shared.state.subscribe();
        rx.wait_for(SessionState::is_closed)
            .await
            .ok()
            .and_then(|state| state.close_reason().cloned())
            .unwrap_or(CloseReason::Requested)
    }

    /// Stream keys currently held in the registry, pending or confirmed.
    ///
    /// Entries survive the session closing, so a caller can resubscribe them
    /// on a fresh session.
    pub fn subscriptions(&self) -> Vec<String> {
        self.shared
            .registry
            .lock()
            .keys()
            .map(str::to_owned)
            .collect()
    }

    /// Registry state of `stream_key`, if subscribed.
    pub fn subscription_state(&self, stream_key: &str) -> Option<SubscriptionState> {
        let registry = self.shared.registry.lock();
        registry.id_of(stream_key).and_then(|id| registry.state(id))
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn ensure_ready(&self) -> Result<()> {
        match self.shared.state() {
            SessionState::Ready => Ok(()),
            SessionState::Closed(_) => Err(TossError::SessionClosed),
            _ => Err(TossError::InvalidArgument(
                "session not connected, call connect() first".into(),
            )),
        }
    }

    async fn wait_confirmed(&self, id: SubscriptionId) -> Result<()> {
        loop {
            // Registered before the check so a receipt in between is not missed.
            let notified = self.shared.receipts.notified();
            if self.shared.registry.lock().is_confirmed(id) {
                return Ok(());
            }
            if self.shared.state().is_closed() {
                return Err(TossError::SessionClosed);
            }
            notified.await;
        }
    }

    async fn handshake(&self, credentials: &Credentials) -> Result<(WriterHalf, ReaderHalf)> {
        let url = Url::parse(&self.config.url)?;
        let mut request = url.as_str().into_client_request()?;
        let protocols = HeaderValue::from_str(&self.config.subprotocols.join(", "))
            .map_err(|_| TossError::InvalidArgument("invalid sub-protocol list".into()))?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", protocols);

        let (ws, _resp) = connect_async(request).await?;
        let (mut write, mut read) = ws.split();

        let connect = frame::build_connect(
            &credentials.device_id,
            &credentials.connection_id,
            &credentials.auth_token,
            self.config.heartbeat_ms,
        );
        write.send(Message::Text(connect.into())).await?;

        let first = tokio::time::timeout(self.config.handshake_timeout, next_text(&mut read))
            .await
            .map_err(|_| TossError::HandshakeFailed("timed out waiting for CONNECTED".into()))??;

        if matches!(frame::parse_frame(&first), InboundFrame::Connected) {
            Ok((write, read))
        } else {
            Err(TossError::HandshakeFailed(first))
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

/// Bootstrap over HTTP and connect a session with default configuration.
pub async fn connect_toss<F>(handler: F) -> Result<Session>
where
    F: Fn(TradeEvent) + Send + Sync + 'static,
{
    let session = Session::new(SessionConfig::default(), handler);
    session.connect_with(&TossClient::new()?).await?;
    Ok(session)
}

// ---------------------------------------------------------------------------
// Receive loop
// ---------------------------------------------------------------------------

/// Read the next text payload, skipping WebSocket control frames.
async fn next_text(read: &mut ReaderHalf) -> Result<String> {
    loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
            Some(Ok(Message::Binary(data))) => {
                return String::from_utf8(data.to_vec()).map_err(|_| {
                    TossError::HandshakeFailed("non-UTF-8 binary frame".into())
                });
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(TossError::HandshakeFailed(
                    "connection closed before CONNECTED".into(),
                ));
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

/// Process frames strictly in arrival order until the connection ends or a
/// fatal frame arrives.
async fn receive_loop(mut read: ReaderHalf, shared: Arc<Shared>, handler: TradeHandler) {
    let reason = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                if let Err(reason) = dispatch(&shared, &handler, text.as_str()).await {
                    break reason;
                }
            }
            Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                Ok(text) => {
                    if let Err(reason) = dispatch(&shared, &handler, text).await {
                        break reason;
                    }
                }
                Err(_) => {
                    tracing::warn!(len = data.len(), "Dropping non-UTF-8 binary frame");
                }
            },
            Some(Ok(Message::Close(_))) => {
                tracing::info!("Realtime WebSocket closed by server");
                break CloseReason::ServerClosed;
            }
            // Ping/pong handled by tungstenite
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::error!(error = %e, "Realtime WebSocket error");
                break CloseReason::Transport(e.to_string());
            }
            None => {
                tracing::info!("Realtime WebSocket stream ended");
                break CloseReason::ServerClosed;
            }
        }
    };

    shared.shutdown(reason).await;
}

/// Act on one frame. `Err` ends the loop with the given reason.
async fn dispatch(
    shared: &Shared,
    handler: &TradeHandler,
    raw: &str,
) -> std::result::Result<(), CloseReason> {
    match frame::parse_frame(raw) {
        InboundFrame::Ping => {
            if let Err(e) = shared.send(HEARTBEAT.to_owned()).await {
                tracing::error!(error = %e, "Failed to answer heartbeat");
                return Err(CloseReason::Transport(e.to_string()));
            }
        }
        InboundFrame::Message { body } => match TradeEvent::from_body(body) {
            Ok(trade) => handler(trade),
            Err(e) => {
                tracing::error!(error = %e, body, "Failed to decode trade");
                return Err(CloseReason::MalformedPayload(e.to_string()));
            }
        },
        InboundFrame::Receipt {
            id,
            is_unsubscribe: true,
        } => {
            tracing::debug!(%id, "Unsubscribe receipt");
        }
        InboundFrame::Receipt {
            id,
            is_unsubscribe: false,
        } => {
            let confirmed = shared.registry.lock().mark_confirmed(id);
            match confirmed {
                Ok(()) => tracing::debug!(%id, "Subscribe receipt"),
                Err(e) => tracing::warn!(%id, error = %e, "Ignoring stray receipt"),
            }
            shared.receipts.notify_waiters();
        }
        InboundFrame::Connected => {
            tracing::debug!("Ignoring repeated CONNECTED");
        }
        InboundFrame::Unrecognized(other) => {
            tracing::warn!(frame = other, "Unexpected frame");
        }
    }
    Ok(())
}
