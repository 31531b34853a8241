//! Error types for the `tossinvest-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, TossError>`.
//!
//! [`TossError`] covers:
//! - **Transport errors** — WebSocket connect/send/receive failures
//! - **Handshake errors** — the server did not answer CONNECT with CONNECTED
//! - **Subscription errors** — registry misuse and unanswered subscribes
//! - **Payload errors** — MESSAGE bodies that do not decode into a trade
//! - **Session errors** — operations attempted after the session closed
//! - **Bootstrap errors** — HTTP, cookie, and URL failures during `init`

use crate::ws::registry::SubscriptionId;

/// All possible errors produced by the `tossinvest-rs` client.
#[derive(Debug, thiserror::Error)]
pub enum TossError {
    /// The WebSocket could not be opened, or failed while in use.
    #[error("transport error: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),

    /// The server did not confirm the CONNECT frame.
    #[error("STOMP handshake failed: {0}")]
    HandshakeFailed(String),

    /// The stream key already has an active subscription.
    #[error("already subscribed to {0}")]
    AlreadySubscribed(String),

    /// The stream key has no active subscription.
    #[error("not subscribed to {0}")]
    NotSubscribed(String),

    /// A receipt referenced a subscription id the registry does not know.
    #[error("unknown subscription id {0}")]
    UnknownSubscription(SubscriptionId),

    /// A MESSAGE body could not be decoded into a trade event.
    #[error("malformed trade payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The session is closed; construct a new one to reconnect.
    #[error("session closed")]
    SessionClosed,

    /// The server never sent the RECEIPT for a subscribe request.
    #[error("no receipt for subscription {id} ({stream_key})")]
    SubscribeTimeout {
        /// Stream key that was being subscribed.
        stream_key: String,
        /// Id allocated for the request.
        id: SubscriptionId,
    },

    /// The server returned an unexpected HTTP status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The init response did not set the named cookie.
    #[error("init response is missing the {0} cookie")]
    MissingCookie(&'static str),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for TossError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TossError>;
