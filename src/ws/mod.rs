//! Realtime trade feed over STOMP/WebSocket.
//!
//! Toss Invest pushes live trades on `wss://realtime-socket.tossinvest.com/ws`
//! using STOMP 1.2 text frames carried one per WebSocket message.
//!
//! ## [`session`] — Session and receive loop
//!
//! Owns the connection, enforces connect-before-subscribe, blocks
//! `subscribe` until the server's RECEIPT arrives, and hands every trade to a
//! caller-supplied handler.
//!
//! ## [`frame`] — Frame codec
//!
//! Builds CONNECT / SUBSCRIBE / UNSUBSCRIBE frames and classifies inbound
//! ones (heartbeat, CONNECTED, MESSAGE, RECEIPT).
//!
//! ## [`registry`] — Subscription registry
//!
//! Stream key ↔ subscription id bookkeeping with pending/confirmed state.
//!
//! ## Limits
//!
//! - One subscribe/unsubscribe in flight per session
//! - No automatic reconnect; a closed session stays closed

pub mod frame;
pub mod registry;
pub mod session;
