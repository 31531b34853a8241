//! STOMP frame construction and classification.
//!
//! Frames are plain text of the form
//!
//! ```text
//! COMMAND
//! header1:value1
//! header2:value2
//!
//! BODY\0
//! ```
//!
//! Each WebSocket message carries exactly one complete frame, so there is no
//! streaming parser here: [`parse_frame`] classifies a whole message at once.
//! A lone `"\n"` is the heartbeat.

use crate::constants::{RECEIPT_SUFFIX, STOMP_ACCEPT_VERSION, TRADE_DESTINATION_PREFIX};
use crate::ws::registry::SubscriptionId;

const NUL: char = '\0';
const HEADER_BODY_SEPARATOR: &str = "\n\n";

// ---------------------------------------------------------------------------
// Generic frame
// ---------------------------------------------------------------------------

/// A STOMP frame split into command, headers, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame<'a> {
    pub command: &'a str,
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: &'a str,
}

impl<'a> StompFrame<'a> {
    /// Split a raw frame into its parts.
    ///
    /// Returns `None` when there is no blank line separating the headers from
    /// the body. The body stops at the first NUL, or at the end of the text
    /// when the terminator is missing.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (head, rest) = raw.split_once(HEADER_BODY_SEPARATOR)?;
        let body = rest.split(NUL).next().unwrap_or_default();

        let mut lines = head.lines();
        let command = lines.next()?.trim_end_matches('\r');
        let headers = lines
            .filter_map(|line| line.trim_end_matches('\r').split_once(':'))
            .collect();

        Some(Self {
            command,
            headers,
            body,
        })
    }

    /// Value of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
    }
}

/// Builder for outbound frames.
///
/// Outbound frames end with `\0\n`; the trailing line feed is what the feed
/// server expects after the NUL terminator.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    buf: String,
}

impl FrameBuilder {
    pub fn new(command: &str) -> Self {
        let mut buf = String::with_capacity(128);
        buf.push_str(command);
        buf.push('\n');
        Self { buf }
    }

    pub fn header(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        use std::fmt::Write;
        let _ = writeln!(self.buf, "{name}:{value}");
        self
    }

    /// Finish with an empty body.
    pub fn build(mut self) -> String {
        self.buf.push('\n');
        self.buf.push(NUL);
        self.buf.push('\n');
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Outbound frames
// ---------------------------------------------------------------------------

/// Destination a stream key is subscribed under.
pub fn trade_destination(stream_key: &str) -> String {
    format!("{TRADE_DESTINATION_PREFIX}{stream_key}")
}

/// Receipt tag requested for a subscription id.
pub fn receipt_tag(id: SubscriptionId) -> String {
    format!("{id}{RECEIPT_SUFFIX}")
}

/// Build the CONNECT frame.
///
/// `heartbeat` is the `(send, receive)` interval pair in milliseconds.
pub fn build_connect(
    device_id: &str,
    connection_id: &str,
    auth_token: &str,
    heartbeat: (u64, u64),
) -> String {
    FrameBuilder::new("CONNECT")
        .header("device-id", device_id)
        .header("connection-id", connection_id)
        .header("authorization", auth_token)
        .header("accept-version", STOMP_ACCEPT_VERSION)
        .header("heart-beat", format!("{},{}", heartbeat.0, heartbeat.1))
        .build()
}

/// Build a SUBSCRIBE frame for the trade stream of `stream_key`.
pub fn build_subscribe(stream_key: &str, id: SubscriptionId) -> String {
    FrameBuilder::new("SUBSCRIBE")
        .header("id", id)
        .header("receipt", receipt_tag(id))
        .header("destination", trade_destination(stream_key))
        .build()
}

/// Build an UNSUBSCRIBE frame.
///
/// The stream key is not part of the frame; the server identifies the
/// subscription by `id` alone.
pub fn build_unsubscribe(_stream_key: &str, id: SubscriptionId) -> String {
    FrameBuilder::new("UNSUBSCRIBE")
        .header("receipt", receipt_tag(id))
        .header("id", id)
        .build()
}

// ---------------------------------------------------------------------------
// Inbound classification
// ---------------------------------------------------------------------------

/// An inbound frame, classified by the receive loop's needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame<'a> {
    /// Heartbeat; answer with [`HEARTBEAT`](crate::constants::HEARTBEAT).
    Ping,
    /// Handshake confirmation.
    Connected,
    /// A subscription message. `body` is the JSON payload.
    Message { body: &'a str },
    /// Acknowledgement of a SUBSCRIBE or UNSUBSCRIBE.
    Receipt {
        id: SubscriptionId,
        is_unsubscribe: bool,
    },
    /// Anything else, kept verbatim for logging.
    Unrecognized(&'a str),
}

/// Classify a raw text message.
pub fn parse_frame(raw: &str) -> InboundFrame<'_> {
    if raw.len() == 1 {
        return InboundFrame::Ping;
    }

    let command = raw
        .split(|c: char| c == '\n' || c == '\r')
        .next()
        .unwrap_or_default();

    match command {
        "CONNECTED" => InboundFrame::Connected,
        "MESSAGE" => match StompFrame::parse(raw) {
            Some(frame) => InboundFrame::Message { body: frame.body },
            None => InboundFrame::Unrecognized(raw),
        },
        "RECEIPT" => match receipt_id(raw) {
            Some(id) => InboundFrame::Receipt {
                id,
                is_unsubscribe: raw.contains("unsubscribe"),
            },
            None => InboundFrame::Unrecognized(raw),
        },
        _ => InboundFrame::Unrecognized(raw),
    }
}

/// Numeric prefix of the `receipt-id` header, up to the first `-`.
fn receipt_id(raw: &str) -> Option<SubscriptionId> {
    let value = raw
        .lines()
        .find_map(|line| line.strip_prefix("receipt-id:"))?;
    let prefix = value.split('-').next()?;
    prefix.trim().parse().ok().map(SubscriptionId)
}
