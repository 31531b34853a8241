//! Data types exchanged with the Toss Invest endpoints.
//!
//! ## Organization
//!
//! - [`enums`] — Wire enumerations (trade side, price change direction)
//! - [`trade`] — The trade event pushed on each MESSAGE frame
//! - [`credentials`] — Connection credentials and the provider trait
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod credentials;
pub mod enums;
pub mod trade;

pub use credentials::{CredentialProvider, Credentials};
pub use enums::*;
pub use trade::TradeEvent;
