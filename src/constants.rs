//! Constants for the Toss Invest web trading endpoints.
//!
//! Contains base URLs, the STOMP wire conventions used by the real-time
//! socket, and the default timings applied by
//! [`SessionConfig`](crate::ws::session::SessionConfig). They are exported for
//! advanced usage such as pointing a session at a test server.

// ---------------------------------------------------------------------------
// Base URLs
// ---------------------------------------------------------------------------

/// Base URL for the web trading REST API (session bootstrap).
pub const API_BASE_URL: &str = "https://wts-api.tossinvest.com";

/// Path of the init endpoint that issues the `UTK` cookie.
pub const INIT_PATH: &str = "/api/v3/init";

/// Origin the web trading frontend is served from.
pub const WEB_ORIGIN: &str = "https://tossinvest.com";

// ---------------------------------------------------------------------------
// WebSocket
// ---------------------------------------------------------------------------

/// WebSocket endpoint for the real-time STOMP feed.
pub const WS_REALTIME_URL: &str = "wss://realtime-socket.tossinvest.com/ws";

/// WebSocket sub-protocols offered during the upgrade, most preferred first.
pub const STOMP_SUBPROTOCOLS: [&str; 3] = ["v12.stomp", "v11.stomp", "v10.stomp"];

/// Value of the `accept-version` header in the CONNECT frame.
pub const STOMP_ACCEPT_VERSION: &str = "1.2,1.1,1.0";

/// Heartbeat payload, sent by the server and echoed back by the client.
pub const HEARTBEAT: &str = "\n";

/// Destination prefix for US stock trade streams; the stream key is appended.
pub const TRADE_DESTINATION_PREFIX: &str = "/topic/v1/us/stock/trade/";

/// Suffix appended to the subscription id to form a receipt tag.
pub const RECEIPT_SUFFIX: &str = "-sub_receipt";

/// Cookie that carries the authorization token after init.
pub const AUTH_COOKIE: &str = "UTK";

// ---------------------------------------------------------------------------
// Session defaults
// ---------------------------------------------------------------------------

/// Session timing defaults.
pub mod defaults {
    /// Heartbeat interval (ms) advertised for both directions.
    pub const HEARTBEAT_MS: u64 = 5_000;
    /// Maximum wait for CONNECTED after sending CONNECT (ms).
    pub const HANDSHAKE_TIMEOUT_MS: u64 = 10_000;
    /// Maximum wait for a subscribe RECEIPT (ms).
    pub const SUBSCRIBE_TIMEOUT_MS: u64 = 10_000;
    /// Pause after sending UNSUBSCRIBE before releasing the request lock (ms).
    pub const UNSUBSCRIBE_SETTLE_MS: u64 = 400;
}
