//! The OGC API Tiles source and its building blocks.
//!
//! - [`Discoverer`]: finds the map tilesets of a landing page, once
//! - [`TilesetResolver`]: turns a (CRS, media type) pair into a grid and a tile
//!   URL template, once per pair
//! - [`OgcApiTilesSource`]: answers map queries, fetching single tiles itself
//!   and delegating everything else to the cache subsystem
//! - [`ErrorHandler`]: substitute responses for failed tile fetches
//! - [`CacheLayerBuilder`]: the cache subsystem, as seen from the source

mod delegate;
mod discovery;
mod error_handler;
mod fetch;
mod ogcapi;
mod resolver;

pub use delegate::{
    CacheConfiguration, CacheLayerBuilder, NamedGrid, NamedSource, DELEGATED_CACHE_NAME,
    DELEGATED_SOURCE_NAME,
};
pub use discovery::{Discoverer, DiscoveryRetry};
pub use error_handler::{ErrorHandler, ErrorResponse, StatusErrorHandler};
pub use ogcapi::{OgcApiTilesSource, SourceOptions};
pub use resolver::{build_tile_url, ResolvedTileset, TilesetResolver};
