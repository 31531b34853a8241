#![allow(missing_docs)]
//! Trade event delivered on `/topic/v1/us/stock/trade/{code}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TossError};
use crate::types::enums::*;

/// A single executed trade on a US stock, as pushed by the real-time feed.
///
/// Prices come in two currencies: the listing currency (`currency`, usually
/// `"USD"`) and KRW, the settlement currency of the account.
///
/// Decoding is strict: `dt` must be RFC 3339 with a zone (`Z` or an offset,
/// normalised to UTC) and the volume fields must be whole numbers. A body
/// that breaks either rule is a [`TossError::MalformedPayload`], which ends
/// the session.
///
/// ```json
/// {"code":"US20220225003","dt":"2025-07-24T06:56:04Z","session":"DAY",
///  "currency":"USD","base":1.01,"close":1.42,"baseKrw":1392.891,
///  "closeKrw":1958.322,"volume":23,"tradeType":"BUY","changeType":"UP",
///  "tradingStrength":176.27,"cumulativeVolume":378269,
///  "cumulativeAmount":506617,"cumulativeAmountKrw":698675504.7}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    /// Instrument code, the same string used as the stream key.
    pub code: String,
    /// Execution time.
    pub dt: DateTime<Utc>,
    /// Trading session (e.g. `"DAY"`).
    pub session: String,
    pub currency: String,
    /// Reference (previous close) price.
    pub base: f64,
    /// Trade price.
    pub close: f64,
    pub base_krw: f64,
    pub close_krw: f64,
    /// Quantity of this trade.
    pub volume: u64,
    pub trade_type: TradeType,
    pub change_type: ChangeType,
    /// Buy volume over sell volume, as a percentage.
    pub trading_strength: f64,
    pub cumulative_volume: u64,
    pub cumulative_amount: f64,
    pub cumulative_amount_krw: f64,
}

impl TradeEvent {
    /// Decode the JSON body of a MESSAGE frame.
    ///
    /// Missing or mistyped fields yield [`TossError::MalformedPayload`].
    pub fn from_body(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(TossError::MalformedPayload)
    }
}
