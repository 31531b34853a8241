//! # tossinvest-rs
//!
//! A Rust client for the Toss Invest real-time US stock trade feed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tossinvest_rs::ws::session::connect_toss;
//!
//! #[tokio::main]
//! async fn main() -> tossinvest_rs::error::Result<()> {
//!     let session = connect_toss(|trade| println!("{trade:?}")).await?;
//!     session.subscribe("US20220225003").await?;
//!     session.closed().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod constants;
pub mod error;
pub mod types;
pub mod ws;

/// Re-export the bootstrap client at crate root for convenience.
pub use client::TossClient;
/// Re-export the error type and Result alias.
pub use error::{Result, TossError};
/// Re-export the session types.
pub use ws::session::{Session, SessionBuilder, SessionConfig, connect_toss};
