//! REST API endpoint implementations.
//!
//! Each sub-module adds `async` methods to
//! [`TossClient`](crate::client::TossClient) via `impl` blocks.
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`init`] | 1 | Realtime socket credentials |

pub mod init;
