//! Session bootstrap endpoint.
//!
//! The real-time socket authenticates with a token that the web frontend
//! receives as the `UTK` cookie from the init endpoint. The connection and
//! device identifiers are generated client-side.

use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::client::TossClient;
use crate::constants::{AUTH_COOKIE, INIT_PATH};
use crate::error::{Result, TossError};
use crate::types::credentials::Credentials;

impl TossClient {
    /// Obtain fresh connection credentials.
    ///
    /// Generates a connection id (UUIDv4) and a device id, then calls the init
    /// endpoint with the device id in the cookie jar. The `UTK` cookie of the
    /// response becomes the auth token.
    ///
    /// **Endpoint:** `GET https://wts-api.tossinvest.com/api/v3/init`
    pub async fn init(&self) -> Result<Credentials> {
        let device_id = generate_device_id();
        let connection_id = uuid::Uuid::new_v4().to_string();

        let url = self.url(INIT_PATH);
        tracing::debug!(%url, "GET init");

        let cookie = HeaderValue::from_str(&format!(
            "x-toss-distribution-id=53; deviceId={device_id}"
        ))
        .map_err(|_| TossError::InvalidArgument("device id is not a valid cookie value".into()))?;

        let resp = self
            .http()
            .get(&url)
            .header(header::COOKIE, cookie)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TossError::HttpStatus { status, body });
        }

        let auth_token =
            cookie_value(resp.headers(), AUTH_COOKIE).ok_or(TossError::MissingCookie(AUTH_COOKIE))?;

        tracing::info!(%connection_id, %device_id, "Obtained realtime credentials");

        Ok(Credentials {
            connection_id,
            device_id,
            auth_token,
        })
    }
}

/// `WTS-` followed by 32 lowercase hex digits.
fn generate_device_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("WTS-{hex}")
}

/// Value of cookie `name` from the `Set-Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            let pair = v.split(';').next()?;
            let (k, val) = pair.split_once('=')?;
            (k.trim() == name).then(|| val.trim().to_owned())
        })
}
