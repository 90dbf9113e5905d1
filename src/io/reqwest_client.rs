use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use super::{HttpClient, HttpResponse};
use crate::error::IoError;

/// Default request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("ogcapi-tiles-source/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed implementation of [`HttpClient`].
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a client with the default timeout and user agent.
    pub fn new() -> Result<Self, IoError> {
        Self::with_options(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Create a client with a custom request timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, IoError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| IoError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, accept: Option<&str>) -> Result<HttpResponse, IoError> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let resp = request.send().await.map_err(|e| IoError::Connection {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IoError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = resp.bytes().await.map_err(|e| IoError::Connection {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
