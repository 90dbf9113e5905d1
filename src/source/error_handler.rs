//! Substitute responses for failed tile fetches.

use std::collections::HashMap;

use bytes::Bytes;

use crate::layer::{MapQuery, MapResponse, TileImage};

/// Decides what to answer when a tile fetch fails.
///
/// `status` is the HTTP status code of the failure, `None` when the server
/// could not be reached. Returning `None` lets the error propagate.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, status: Option<u16>, query: &MapQuery) -> Option<MapResponse>;
}

/// What a [`StatusErrorHandler`] answers for a given status.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorResponse {
    Blank,
    Image { data: Bytes, content_type: String },
}

impl ErrorResponse {
    fn to_map_response(&self) -> MapResponse {
        match self {
            ErrorResponse::Blank => MapResponse::Blank,
            ErrorResponse::Image { data, content_type } => MapResponse::Image(TileImage {
                data: data.clone(),
                content_type: Some(content_type.clone()),
            }),
        }
    }
}

/// Error handler keyed by HTTP status code.
#[derive(Debug, Clone, Default)]
pub struct StatusErrorHandler {
    responses: HashMap<u16, ErrorResponse>,
    fallback: Option<ErrorResponse>,
}

impl StatusErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `response` for failures with `status`.
    pub fn on_status(mut self, status: u16, response: ErrorResponse) -> Self {
        self.responses.insert(status, response);
        self
    }

    /// Answer `response` for every other failure, including unreachable servers.
    pub fn otherwise(mut self, response: ErrorResponse) -> Self {
        self.fallback = Some(response);
        self
    }
}

impl ErrorHandler for StatusErrorHandler {
    fn handle(&self, status: Option<u16>, _query: &MapQuery) -> Option<MapResponse> {
        status
            .and_then(|status| self.responses.get(&status))
            .or(self.fallback.as_ref())
            .map(ErrorResponse::to_map_response)
    }
}
