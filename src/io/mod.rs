mod http_client;
mod reqwest_client;

pub use http_client::{HttpClient, HttpResponse, JSON_MEDIA_TYPE};
pub use reqwest_client::{ReqwestHttpClient, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT};
