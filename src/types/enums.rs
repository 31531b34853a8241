//! Enum types that map directly to the feed's JSON string values.
//!
//! Variant names use `SCREAMING_SNAKE_CASE` to match the wire format sent by
//! the trade stream, so we suppress the Rust naming convention lint.
#![allow(non_camel_case_types)]

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trade Type
// ---------------------------------------------------------------------------

/// Aggressor side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    BUY,
    SELL,
}

// ---------------------------------------------------------------------------
// Change Type
// ---------------------------------------------------------------------------

/// Direction of the last price relative to the reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    /// Price above the reference.
    UP,
    /// Price below the reference.
    DOWN,
    /// Unchanged.
    FLAT,
}
