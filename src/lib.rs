//! # OGC API Tiles source
//!
//! A map source that serves map images from a remote OGC API Tiles service.
//!
//! The source discovers the map tilesets a landing page (or one of its
//! collections) publishes, picks for each requested CRS and image format a tile
//! matrix set and a tile URL template, and answers map queries either by
//! fetching a single tile directly or by handing the query to a cache
//! subsystem built on top of the same source.
//!
//! ## Features
//!
//! - **Lazy discovery**: the landing page is only contacted on the first query,
//!   once, no matter how many tasks query concurrently
//! - **Resolution cache**: each (CRS, media type) pair is resolved at most once
//! - **Single-tile fast path**: queries aligned with the grid cost one request
//! - **Gates**: optional coverage and resolution range answer blank without
//!   network traffic
//!
//! ## Architecture
//!
//! - [`ogc`] - OGC API documents: landing page, links, CRS identifiers, tilesets
//! - [`grid`] - Tile grids built from TileMatrixSet documents, coverage gates
//! - [`io`] - HTTP transport abstraction and its reqwest implementation
//! - [`source`] - Discovery, resolution and the map source itself
//! - [`layer`] - Map queries and the layer contract shared with the cache
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ogcapi_tiles_source::{
//!     BBox, LandingPage, MapQuery, OgcApiTilesSource, ReqwestHttpClient, SourceOptions, Srs,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let landing = LandingPage::new("https://maps.example.org/ogcapi", Some("blueMarble"))?;
//!     let client = Arc::new(ReqwestHttpClient::new()?);
//!     let source = OgcApiTilesSource::new(landing, client, SourceOptions::default());
//!
//!     let query = MapQuery::new(
//!         BBox::new(-20037508.34, -20037508.34, 20037508.34, 20037508.34),
//!         (256, 256),
//!         Srs::new("EPSG:3857"),
//!         "png",
//!     );
//!     let response = source.get_map(&query).await?;
//!     println!("blank: {}", response.is_blank());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod io;
pub mod layer;
pub mod ogc;
pub mod source;

// Re-export commonly used types
pub use config::{Cli, Command, GetMapArgs, ResolveArgs, RetryPolicy, SourceConfig};
pub use error::{GridError, IoError, SourceError};
pub use grid::{
    AffectedTiles, BBox, BBoxCoverage, CornerOfOrigin, Coverage, ResolutionRange, TileCoord,
    TileGrid, TileMatrix,
};
pub use io::{HttpClient, HttpResponse, ReqwestHttpClient, JSON_MEDIA_TYPE};
pub use layer::{MapLayer, MapQuery, MapResponse, TileImage};
pub use ogc::{LandingPage, Link, Srs, TilesetDescriptor, TilesetsByCrs};
pub use source::{
    build_tile_url, CacheConfiguration, CacheLayerBuilder, Discoverer, DiscoveryRetry,
    ErrorHandler, ErrorResponse, NamedGrid, NamedSource, OgcApiTilesSource, ResolvedTileset,
    SourceOptions, StatusErrorHandler, TilesetResolver,
};
