//! Map queries and the layer contract shared with the cache subsystem.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;
use crate::grid::BBox;
use crate::ogc::Srs;

/// A request for one map image.
#[derive(Debug, Clone, PartialEq)]
pub struct MapQuery {
    /// Requested area, in `srs` units
    pub bbox: BBox,

    /// Image size in pixels (width, height)
    pub size: (u32, u32),

    pub srs: Srs,

    /// Image format without the `image/` prefix, e.g. `png`
    pub format: String,
}

impl MapQuery {
    pub fn new(bbox: BBox, size: (u32, u32), srs: Srs, format: impl Into<String>) -> Self {
        Self {
            bbox,
            size,
            srs,
            format: format.into(),
        }
    }

    /// Media type of the requested image: `image/{format}`.
    pub fn media_type(&self) -> String {
        format!("image/{}", self.format)
    }
}

/// Raw, undecoded image bytes as served by the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pub data: Bytes,

    /// `Content-Type` of the response, if the server sent one
    pub content_type: Option<String>,
}

/// Answer to a [`MapQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapResponse {
    /// Image data
    Image(TileImage),

    /// Nothing to draw for this request (outside coverage or resolution range)
    Blank,
}

impl MapResponse {
    pub fn is_blank(&self) -> bool {
        matches!(self, MapResponse::Blank)
    }

    /// Image data, unless blank.
    pub fn image(&self) -> Option<&TileImage> {
        match self {
            MapResponse::Image(image) => Some(image),
            MapResponse::Blank => None,
        }
    }
}

/// Anything that can answer map queries.
///
/// Implemented by the OGC API Tiles source and by the layers the cache
/// subsystem builds on top of it.
#[async_trait]
pub trait MapLayer: Send + Sync {
    async fn get_map(&self, query: &MapQuery) -> Result<MapResponse, SourceError>;
}
