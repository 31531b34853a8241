//! HTTP client for the Toss Invest web trading API.
//!
//! The [`TossClient`] struct wraps [`reqwest::Client`] with the browser-like
//! default headers the web trading endpoints expect. Its only job in this
//! crate is the session bootstrap: [`TossClient::init`] (in
//! [`crate::api::init`]) issues the credentials a
//! [`Session`](crate::ws::session::Session) needs to connect.

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::constants::{API_BASE_URL, WEB_ORIGIN};
use crate::error::Result;
use crate::types::credentials::{CredentialProvider, Credentials};

/// Version string the web frontend reports in the `app-version` header.
const APP_VERSION: &str = "2024-12-26 18:33:54";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// HTTP client for the web trading REST API.
///
/// # Example
///
/// ```no_run
/// use tossinvest_rs::client::TossClient;
///
/// # #[tokio::main]
/// # async fn main() -> tossinvest_rs::error::Result<()> {
/// let client = TossClient::new()?;
/// let credentials = client.init().await?;
/// println!("connection id: {}", credentials.connection_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TossClient {
    http: reqwest::Client,
    /// Base URL for REST API requests (defaults to [`API_BASE_URL`]).
    base_url: String,
}

impl TossClient {
    /// Create a client against the production API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    /// Create a client pointing at a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Returns a reference to the underlying `reqwest::Client`.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL from a path segment.
    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Default headers applied to every request.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9"),
        );
        headers.insert("app-version", HeaderValue::from_static(APP_VERSION));
        headers.insert(header::ORIGIN, HeaderValue::from_static(WEB_ORIGIN));
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://tossinvest.com/"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers
    }
}

impl CredentialProvider for TossClient {
    async fn credentials(&self) -> Result<Credentials> {
        self.init().await
    }
}
