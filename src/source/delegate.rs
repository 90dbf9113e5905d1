//! Hand-off to the cache subsystem.
//!
//! When a query cannot be answered with a single tile, the source describes a
//! one-grid, one-source cache configuration and asks a [`CacheLayerBuilder`] to
//! turn it into a layer. The builder is supplied by the embedding application.

use std::fmt;
use std::sync::Arc;

use crate::error::SourceError;
use crate::grid::TileGrid;
use crate::layer::MapLayer;

/// Name given to the grid and the cache of a delegated configuration.
pub const DELEGATED_CACHE_NAME: &str = "ogcapi_tiles_cache";

/// Name given to the source of a delegated configuration.
pub const DELEGATED_SOURCE_NAME: &str = "ogcapi_tiles_source";

/// A grid registered under a name.
#[derive(Debug, Clone)]
pub struct NamedGrid {
    pub name: String,
    pub grid: Arc<TileGrid>,
}

/// A source layer registered under a name.
#[derive(Clone)]
pub struct NamedSource {
    pub name: String,
    pub layer: Arc<dyn MapLayer>,
}

impl fmt::Debug for NamedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Everything the cache subsystem needs to build a cached layer.
#[derive(Debug, Clone)]
pub struct CacheConfiguration {
    pub name: String,
    pub grid: NamedGrid,
    pub source: NamedSource,
}

impl CacheConfiguration {
    /// A cache over one grid and one source, named the way the delegated
    /// configuration always is.
    pub fn single(grid: Arc<TileGrid>, layer: Arc<dyn MapLayer>) -> Self {
        Self {
            name: DELEGATED_CACHE_NAME.to_string(),
            grid: NamedGrid {
                name: DELEGATED_CACHE_NAME.to_string(),
                grid,
            },
            source: NamedSource {
                name: DELEGATED_SOURCE_NAME.to_string(),
                layer,
            },
        }
    }
}

/// Builds a cached map layer from a [`CacheConfiguration`].
///
/// The returned layer may call back into the source it was given, one tile at
/// a time.
pub trait CacheLayerBuilder: Send + Sync {
    fn build_layer(&self, config: CacheConfiguration) -> Result<Arc<dyn MapLayer>, SourceError>;
}
