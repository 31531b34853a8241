//! Session tests against an in-process STOMP server.
//!
//! Each test starts a tokio-tungstenite server on `127.0.0.1:0` that accepts
//! one connection, negotiates `v12.stomp`, answers CONNECT with CONNECTED,
//! and then hands the socket to the test so it can script the server side
//! frame by frame.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

use tossinvest_rs::error::TossError;
use tossinvest_rs::types::{ChangeType, Credentials, TradeEvent, TradeType};
use tossinvest_rs::ws::registry::{SubscriptionId, SubscriptionState};
use tossinvest_rs::ws::session::{CloseReason, Session, SessionBuilder, SessionState};

const CONNECTED: &str = "CONNECTED\nversion:1.2\nheart-beat:5000,5000\n\n\0";

const TRADE_BODY: &str = r#"{"code":"US20220225003","dt":"2025-07-24T06:56:04Z","session":"DAY","currency":"USD","base":1.01,"close":1.42,"baseKrw":1392.891,"closeKrw":1958.322,"volume":23,"tradeType":"BUY","changeType":"UP","tradingStrength":176.27,"cumulativeVolume":378269,"cumulativeAmount":506617,"cumulativeAmountKrw":698675504.7}"#;

// ============================================================================
// Test Fixtures
// ============================================================================

type ServerWs = WebSocketStream<TcpStream>;

fn credentials() -> Credentials {
    Credentials::new(
        "3f1c2d9e-8a4b-4c6d-9e0f-1a2b3c4d5e6f",
        "WTS-0123456789abcdef0123456789abcdef",
        "test-utk",
    )
}

fn negotiate(_req: &Request, mut resp: Response) -> Result<Response, ErrorResponse> {
    resp.headers_mut()
        .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("v12.stomp"));
    Ok(resp)
}

fn receipt(id: u64) -> String {
    format!("RECEIPT\nreceipt-id:{id}-sub_receipt\n\n\0")
}

fn message(code: &str, body: &str) -> String {
    format!(
        "MESSAGE\ndestination:/topic/v1/us/stock/trade/{code}\nsubscription:0\n\
         message-id:1\ncontent-type:application/json\n\n{body}\0"
    )
}

/// Value of `name` in a raw frame's header lines.
fn header<'a>(frame: &'a str, name: &str) -> Option<&'a str> {
    frame
        .lines()
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(':'))
}

/// Server side of one accepted connection.
struct MockServer {
    ws: ServerWs,
    connect_frame: String,
}

impl MockServer {
    async fn send(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_owned().into()))
            .await
            .expect("server send failed");
    }

    /// Next text frame from the client.
    async fn recv(&mut self) -> String {
        loop {
            let msg = timeout(Duration::from_secs(2), self.ws.next())
                .await
                .expect("timeout waiting for client frame")
                .expect("client closed the connection")
                .expect("server read error");
            if let Message::Text(text) = msg {
                return text.as_str().to_owned();
            }
        }
    }

    /// Assert that no text frame arrives within `window`.
    async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(Ok(Message::Text(text)))) = timeout(window, self.ws.next()).await {
            panic!("unexpected frame from client: {text:?}");
        }
    }
}

/// Start a server that accepts one connection and replies to CONNECT with
/// `reply`.
async fn spawn_server(reply: &'static str) -> (String, JoinHandle<MockServer>) {
    spawn_server_with(Some(reply)).await
}

/// Like [`spawn_server`], but leaves CONNECT unanswered when `reply` is `None`.
async fn spawn_server_with(reply: Option<&'static str>) -> (String, JoinHandle<MockServer>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_hdr_async(stream, negotiate).await.unwrap();
        let mut server = MockServer {
            ws,
            connect_frame: String::new(),
        };
        server.connect_frame = server.recv().await;
        if let Some(reply) = reply {
            server.send(reply).await;
        }
        server
    });

    (url, handle)
}

/// Build a session from `builder`, connect it, and return both ends.
async fn connect_session(builder: SessionBuilder) -> (Arc<Session>, MockServer) {
    let (url, server) = spawn_server(CONNECTED).await;
    let session = builder.url(url).build();
    session
        .connect_with(&credentials())
        .await
        .expect("connect failed");
    (Arc::new(session), server.await.unwrap())
}

fn quiet_builder() -> SessionBuilder {
    SessionBuilder::new(|_| {})
        .subscribe_timeout(Duration::from_secs(2))
        .unsubscribe_settle(Duration::from_millis(10))
}

/// Subscribe `key` and confirm it from the server side.
async fn subscribe_confirmed(
    session: &Arc<Session>,
    server: &mut MockServer,
    key: &str,
) -> SubscriptionId {
    let task = {
        let session = Arc::clone(session);
        let key = key.to_owned();
        tokio::spawn(async move { session.subscribe(&key).await })
    };
    let frame = server.recv().await;
    let id: u64 = header(&frame, "id").unwrap().parse().unwrap();
    server.send(&receipt(id)).await;
    task.await.unwrap().expect("subscribe failed")
}

// ============================================================================
// Connect
// ============================================================================

#[tokio::test]
async fn test_connect_sends_credentials() {
    let (session, server) = connect_session(quiet_builder()).await;

    assert_eq!(session.state(), SessionState::Ready);

    let frame = &server.connect_frame;
    assert!(frame.starts_with("CONNECT\n"));
    assert_eq!(header(frame, "device-id"), Some("WTS-0123456789abcdef0123456789abcdef"));
    assert_eq!(
        header(frame, "connection-id"),
        Some("3f1c2d9e-8a4b-4c6d-9e0f-1a2b3c4d5e6f")
    );
    assert_eq!(header(frame, "authorization"), Some("test-utk"));
    assert_eq!(header(frame, "accept-version"), Some("1.2,1.1,1.0"));
    assert_eq!(header(frame, "heart-beat"), Some("5000,5000"));
    assert!(frame.ends_with("\n\n\0\n"));
}

#[tokio::test]
async fn test_connect_rejected_is_handshake_failed() {
    let (url, server) = spawn_server("ERROR\nmessage:Invalid authorization\n\n\0").await;
    let session = quiet_builder().url(url).build();

    let err = session.connect(&credentials()).await.unwrap_err();
    assert!(matches!(err, TossError::HandshakeFailed(_)));
    assert!(matches!(
        session.state(),
        SessionState::Closed(CloseReason::HandshakeFailed(_))
    ));
    drop(server);
}

#[tokio::test]
async fn test_connect_unreachable_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = quiet_builder().url(format!("ws://{addr}/ws")).build();
    let err = session.connect(&credentials()).await.unwrap_err();

    assert!(matches!(err, TossError::Transport(_)));
    assert!(session.state().is_closed());
}

#[tokio::test]
async fn test_connect_twice_is_rejected() {
    let (session, _server) = connect_session(quiet_builder()).await;
    let err = session.connect(&credentials()).await.unwrap_err();
    assert!(matches!(err, TossError::InvalidArgument(_)));
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_subscribe_before_connect_is_rejected() {
    let session = quiet_builder().build();
    let err = session.subscribe("AAPL").await.unwrap_err();
    assert!(matches!(err, TossError::InvalidArgument(_)));
    assert_eq!(session.state(), SessionState::Created);
}

// ============================================================================
// Subscribe / Unsubscribe
// ============================================================================

#[tokio::test]
async fn test_subscribe_waits_for_matching_receipt() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.subscribe("XYZ").await })
    };

    let frame = server.recv().await;
    assert!(frame.starts_with("SUBSCRIBE\n"));
    assert_eq!(header(&frame, "id"), Some("0"));
    assert_eq!(header(&frame, "receipt"), Some("0-sub_receipt"));
    assert_eq!(
        header(&frame, "destination"),
        Some("/topic/v1/us/stock/trade/XYZ")
    );

    // An unrelated receipt must not release the caller
    server.send(&receipt(7)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!task.is_finished(), "subscribe returned on a foreign receipt");
    assert_eq!(
        session.subscription_state("XYZ"),
        Some(SubscriptionState::Pending)
    );

    server.send(&receipt(0)).await;
    let id = timeout(Duration::from_secs(2), task)
        .await
        .expect("subscribe did not return")
        .unwrap()
        .unwrap();

    assert_eq!(id, SubscriptionId(0));
    assert_eq!(
        session.subscription_state("XYZ"),
        Some(SubscriptionState::Confirmed)
    );
}

#[tokio::test]
async fn test_subscribe_then_unsubscribe_leaves_no_entry() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    let id = subscribe_confirmed(&session, &mut server, "AAPL").await;
    assert_eq!(session.subscriptions(), vec!["AAPL".to_owned()]);

    session.unsubscribe("AAPL").await.unwrap();

    let frame = server.recv().await;
    assert!(frame.starts_with("UNSUBSCRIBE\n"));
    assert_eq!(header(&frame, "id"), Some(id.to_string().as_str()));
    assert!(session.subscriptions().is_empty());
    assert_eq!(session.subscription_state("AAPL"), None);
}

#[tokio::test]
async fn test_subscribe_twice_is_already_subscribed() {
    let (session, mut server) = connect_session(quiet_builder()).await;
    subscribe_confirmed(&session, &mut server, "AAPL").await;

    let err = session.subscribe("AAPL").await.unwrap_err();
    assert!(matches!(err, TossError::AlreadySubscribed(_)));
    server.expect_silence(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_unsubscribe_unknown_is_not_subscribed() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    let err = session.unsubscribe("AAPL").await.unwrap_err();
    assert!(matches!(err, TossError::NotSubscribed(_)));
    server.expect_silence(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_subscribe_timeout_releases_entry() {
    let builder = quiet_builder().subscribe_timeout(Duration::from_millis(200));
    let (session, mut server) = connect_session(builder).await;

    let err = session.subscribe("XYZ").await.unwrap_err();
    match err {
        TossError::SubscribeTimeout { stream_key, id } => {
            assert_eq!(stream_key, "XYZ");
            assert_eq!(id, SubscriptionId(0));
        }
        other => panic!("expected SubscribeTimeout, got {other:?}"),
    }
    assert_eq!(session.subscription_state("XYZ"), None);
    assert!(server.recv().await.starts_with("SUBSCRIBE\n"));

    // The server is told to drop the unanswered subscription
    let frame = server.recv().await;
    assert!(frame.starts_with("UNSUBSCRIBE\n"));
    assert_eq!(header(&frame, "id"), Some("0"));

    // A late receipt for it changes nothing, and the key can be retried
    server.send(&receipt(0)).await;
    let id = subscribe_confirmed(&session, &mut server, "XYZ").await;
    assert_eq!(id, SubscriptionId(1));
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_cancelled_subscribe_is_rolled_back() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    let result = timeout(Duration::from_millis(100), session.subscribe("XYZ")).await;
    assert!(result.is_err(), "subscribe finished without a receipt");
    assert_eq!(session.subscription_state("XYZ"), None);

    assert!(server.recv().await.starts_with("SUBSCRIBE\n"));
    let frame = server.recv().await;
    assert!(frame.starts_with("UNSUBSCRIBE\n"));
    assert_eq!(header(&frame, "id"), Some("0"));

    let id = subscribe_confirmed(&session, &mut server, "XYZ").await;
    assert_eq!(id, SubscriptionId(1));
}

#[tokio::test]
async fn test_concurrent_subscribes_are_not_misattributed() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    let spawn = |key: &'static str| {
        let session = Arc::clone(&session);
        tokio::spawn(async move { (key, session.subscribe(key).await) })
    };
    let first = spawn("AAA");
    let second = spawn("BBB");

    let mut seen = Vec::new();
    for _ in 0..2 {
        let frame = server.recv().await;
        let id: u64 = header(&frame, "id").unwrap().parse().unwrap();
        let destination = header(&frame, "destination").unwrap().to_owned();

        // A receipt for the other request's id arrives first and must not be
        // credited to this one.
        server.send(&receipt(id + 1)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.send(&receipt(id)).await;

        seen.push((id, destination));
    }

    for task in [first, second] {
        let (key, result) = task.await.unwrap();
        let id = result.expect("subscribe failed");
        let expected = format!("/topic/v1/us/stock/trade/{key}");
        assert!(
            seen.contains(&(id.0, expected)),
            "{key} got id {id}, server saw {seen:?}"
        );
    }
    assert_eq!(
        session.subscription_state("AAA"),
        Some(SubscriptionState::Confirmed)
    );
    assert_eq!(
        session.subscription_state("BBB"),
        Some(SubscriptionState::Confirmed)
    );
}

// ============================================================================
// Receive loop
// ============================================================================

#[tokio::test]
async fn test_heartbeat_is_echoed_once() {
    let (_session, mut server) = connect_session(quiet_builder()).await;

    server.send("\n").await;
    assert_eq!(server.recv().await, "\n");
    server.expect_silence(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_message_dispatches_trade() {
    let (tx, mut rx) = mpsc::unbounded_channel::<TradeEvent>();
    let builder = SessionBuilder::new(move |trade| {
        let _ = tx.send(trade);
    })
    .subscribe_timeout(Duration::from_secs(2));
    let (session, mut server) = connect_session(builder).await;

    subscribe_confirmed(&session, &mut server, "US20220225003").await;
    server.send(&message("US20220225003", TRADE_BODY)).await;

    let trade = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no trade delivered")
        .unwrap();
    assert_eq!(trade.code, "US20220225003");
    assert_eq!(trade.close, 1.42);
    assert_eq!(trade.volume, 23);
    assert_eq!(trade.trade_type, TradeType::BUY);
    assert_eq!(trade.change_type, ChangeType::UP);
    assert_eq!(trade.cumulative_amount_krw, 698675504.7);
}

#[tokio::test]
async fn test_unrecognized_frame_is_not_fatal() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    server.send("ERROR\nmessage:something odd\n\n\0").await;
    server.send(&receipt(42)).await;
    subscribe_confirmed(&session, &mut server, "AAPL").await;

    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_malformed_payload_closes_session() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    server.send(&message("AAPL", r#"{"code":"AAPL"}"#)).await;

    let reason = timeout(Duration::from_secs(2), session.closed())
        .await
        .expect("session did not close");
    assert!(matches!(reason, CloseReason::MalformedPayload(_)));

    let err = session.subscribe("AAPL").await.unwrap_err();
    assert!(matches!(err, TossError::SessionClosed));
}

#[tokio::test]
async fn test_server_close_closes_session() {
    let (session, mut server) = connect_session(quiet_builder()).await;
    let mut state = session.watch_state();

    server.ws.close(None).await.unwrap();

    let reason = timeout(Duration::from_secs(2), session.closed())
        .await
        .expect("session did not close");
    assert_eq!(reason, CloseReason::ServerClosed);
    assert!(state.borrow_and_update().is_closed());
}

#[tokio::test]
async fn test_close_wakes_pending_subscribe() {
    let (session, mut server) = connect_session(quiet_builder()).await;

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.subscribe("XYZ").await })
    };
    server.recv().await;

    session.close().await.unwrap();
    let result = timeout(Duration::from_secs(2), task)
        .await
        .expect("subscribe still waiting after close")
        .unwrap();
    assert!(matches!(result, Err(TossError::SessionClosed)));
}

// ============================================================================
// Close
// ============================================================================

#[tokio::test]
async fn test_operations_after_close_fail_without_sending() {
    let (session, mut server) = connect_session(quiet_builder()).await;
    subscribe_confirmed(&session, &mut server, "AAPL").await;

    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed(CloseReason::Requested));

    assert!(matches!(
        session.subscribe("TSLA").await,
        Err(TossError::SessionClosed)
    ));
    assert!(matches!(
        session.subscribe("").await,
        Err(TossError::SessionClosed)
    ));
    assert!(matches!(
        session.unsubscribe("AAPL").await,
        Err(TossError::SessionClosed)
    ));
    assert!(matches!(session.close().await, Err(TossError::SessionClosed)));
    assert!(matches!(
        session.connect(&credentials()).await,
        Err(TossError::SessionClosed)
    ));

    // Only the WebSocket close handshake reaches the server
    loop {
        match timeout(Duration::from_secs(2), server.ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => panic!("frame sent after close: {text:?}"),
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => break,
            Ok(Some(Ok(_))) => continue,
            Err(_) => panic!("close frame never arrived"),
        }
    }

    // The registry is kept so callers can resubscribe elsewhere
    assert_eq!(session.subscriptions(), vec!["AAPL".to_owned()]);
}

#[tokio::test]
async fn test_close_before_connect() {
    let session = quiet_builder().build();
    session.close().await.unwrap();

    assert_eq!(session.closed().await, CloseReason::Requested);
    assert!(matches!(
        session.connect(&credentials()).await,
        Err(TossError::SessionClosed)
    ));
}

#[tokio::test]
async fn test_close_during_handshake_stops_session() {
    let (url, server) = spawn_server_with(None).await;
    let session = Arc::new(quiet_builder().url(url).build());

    let connecting = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.connect(&credentials()).await })
    };
    let mut server = server.await.unwrap();
    assert_eq!(session.state(), SessionState::Connecting);

    session.close().await.unwrap();
    server.send(CONNECTED).await;

    let result = timeout(Duration::from_secs(2), connecting)
        .await
        .expect("connect did not return")
        .unwrap();
    assert!(matches!(result, Err(TossError::SessionClosed)));
    assert_eq!(session.state(), SessionState::Closed(CloseReason::Requested));

    // The receive loop is not left running: a heartbeat goes unanswered and
    // the connection is torn down.
    let _ = server.ws.send(Message::Text("\n".to_owned().into())).await;
    loop {
        match timeout(Duration::from_secs(2), server.ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => panic!("frame sent after close: {text:?}"),
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => break,
            Ok(Some(Ok(_))) => continue,
            Err(_) => panic!("connection still open after close"),
        }
    }
}
