use serde_json::Value;
use tracing::warn;

use crate::error::SourceError;
use crate::io::{HttpClient, JSON_MEDIA_TYPE};

/// GET `url` as JSON.
///
/// Transport failures become [`SourceError::Transport`], unparseable bodies
/// [`SourceError::Protocol`]. Both are logged with the offending URL.
pub(crate) async fn fetch_json(client: &dyn HttpClient, url: &str) -> Result<Value, SourceError> {
    let resp = client.get(url, Some(JSON_MEDIA_TYPE)).await.map_err(|e| {
        warn!(url = %url, "Cannot retrieve {}: {}", url, e);
        SourceError::Transport(e)
    })?;

    serde_json::from_slice(&resp.body).map_err(|e| {
        warn!(url = %url, "Cannot parse response to {} as JSON: {}", url, e);
        SourceError::protocol(url, format!("response is not valid JSON: {}", e))
    })
}
