use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

/// Media type requested for every JSON document of the discovery protocol.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A successful (2xx) HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Value of the `Content-Type` header, if present
    pub content_type: Option<String>,

    /// Response body
    pub body: Bytes,
}

/// Trait for issuing GET requests against remote resources.
///
/// This abstraction keeps the discovery and tile fetching logic independent of
/// the HTTP stack, and lets tests count and script requests. Implementations
/// must be thread-safe: one client is shared by every request a source serves.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url`, sending `accept` as the `Accept` header when given.
    ///
    /// Non-2xx responses must be returned as [`IoError::Status`].
    async fn get(&self, url: &str, accept: Option<&str>) -> Result<HttpResponse, IoError>;
}
