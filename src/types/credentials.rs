//! Connection credentials and the providers that obtain them.

use std::future::Future;

use crate::error::Result;

/// The three values the CONNECT frame needs.
///
/// Obtained once per session, before [`Session::connect`](crate::ws::session::Session::connect),
/// and never modified afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Client-generated UUIDv4 identifying this socket.
    pub connection_id: String,
    /// Client-generated device identifier (`WTS-` + 32 hex chars).
    pub device_id: String,
    /// Value of the `UTK` cookie issued by the init endpoint.
    pub auth_token: String,
}

impl Credentials {
    pub fn new(
        connection_id: impl Into<String>,
        device_id: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            device_id: device_id.into(),
            auth_token: auth_token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("connection_id", &self.connection_id)
            .field("device_id", &self.device_id)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Source of [`Credentials`].
///
/// The session only needs the finished credentials; how they are obtained is
/// up to the provider. [`TossClient`](crate::client::TossClient) performs the
/// HTTP init handshake, and a plain `Credentials` value provides itself.
pub trait CredentialProvider {
    fn credentials(&self) -> impl Future<Output = Result<Credentials>> + Send;
}

impl CredentialProvider for Credentials {
    async fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}
