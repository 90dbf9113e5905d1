//! The OGC API Tiles map source.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        OgcApiTilesSource                         │
//! │  get_map(query)                                                  │
//! │    1. discover()            ──▶ Discoverer (once)                │
//! │    2. resolve(srs, media)   ──▶ TilesetResolver (once per key)   │
//! │    3. grid matches query?                                        │
//! │         yes ──▶ gates ──▶ single tile? ──▶ HttpClient::get       │
//! │         no, or not one tile ──▶ CacheLayerBuilder ──▶ get_map    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The source is a cheap handle: clones share the same discovery state and
//! resolution cache. The cache subsystem is handed such a clone as its source
//! layer and calls back into it one tile at a time.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::delegate::{CacheConfiguration, CacheLayerBuilder};
use super::discovery::{Discoverer, DiscoveryRetry};
use super::error_handler::ErrorHandler;
use super::resolver::{ResolvedTileset, TilesetResolver};
use crate::error::{GridError, SourceError};
use crate::grid::{Coverage, ResolutionRange, TileGrid};
use crate::io::HttpClient;
use crate::layer::{MapLayer, MapQuery, MapResponse, TileImage};
use crate::ogc::{LandingPage, Srs, TilesetsByCrs};

// =============================================================================
// Options
// =============================================================================

/// Optional behavior of an [`OgcApiTilesSource`].
#[derive(Clone, Default)]
pub struct SourceOptions {
    /// Spatial gate; queries outside of it are answered blank
    pub coverage: Option<Arc<dyn Coverage>>,

    /// Resolution gate; queries outside of it are answered blank
    pub res_range: Option<ResolutionRange>,

    /// Substitute responses for failed tile fetches
    pub error_handler: Option<Arc<dyn ErrorHandler>>,

    /// Builds cached layers for queries that do not match the grid
    pub cache_builder: Option<Arc<dyn CacheLayerBuilder>>,

    pub discovery_retry: DiscoveryRetry,
}

impl fmt::Debug for SourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceOptions")
            .field("coverage", &self.coverage)
            .field("res_range", &self.res_range)
            .field("error_handler", &self.error_handler.is_some())
            .field("cache_builder", &self.cache_builder.is_some())
            .field("discovery_retry", &self.discovery_retry)
            .finish()
    }
}

// =============================================================================
// Source
// =============================================================================

struct SourceInner {
    landing: LandingPage,
    client: Arc<dyn HttpClient>,
    discoverer: Discoverer,
    resolver: TilesetResolver,
    options: SourceOptions,
}

/// Map source backed by an OGC API Tiles service.
#[derive(Clone)]
pub struct OgcApiTilesSource {
    inner: Arc<SourceInner>,
}

impl OgcApiTilesSource {
    pub fn new(landing: LandingPage, client: Arc<dyn HttpClient>, options: SourceOptions) -> Self {
        let discoverer = Discoverer::new(landing.clone(), client.clone(), options.discovery_retry);
        let resolver = TilesetResolver::new(landing.clone(), client.clone());

        Self {
            inner: Arc::new(SourceInner {
                landing,
                client,
                discoverer,
                resolver,
                options,
            }),
        }
    }

    pub fn landing_page(&self) -> &LandingPage {
        &self.inner.landing
    }

    pub fn options(&self) -> &SourceOptions {
        &self.inner.options
    }

    /// Map tilesets of the service grouped by CRS.
    pub async fn discover(&self) -> Result<Arc<TilesetsByCrs>, SourceError> {
        self.inner.discoverer.discover().await
    }

    /// Grid and tile URL template serving `srs` in `media_type`.
    pub async fn resolve(&self, srs: &Srs, media_type: &str) -> Result<ResolvedTileset, SourceError> {
        let tilesets = self.discover().await?;
        self.inner.resolver.resolve(&tilesets, srs, media_type).await
    }

    /// Number of (CRS, media type) pairs resolved so far.
    pub async fn resolved_count(&self) -> usize {
        self.inner.resolver.cached_count().await
    }

    /// Answer a map query.
    ///
    /// Queries whose SRS and pixel size match the resolved grid are served by
    /// fetching one tile. Everything else goes through the cache subsystem.
    pub async fn get_map(&self, query: &MapQuery) -> Result<MapResponse, SourceError> {
        let media_type = query.media_type();
        let resolved = self.resolve(&query.srs, &media_type).await?;

        let grid = &resolved.grid;
        if grid.tile_size() == query.size && *grid.srs() == query.srs {
            self.get_single_tile(query, &resolved, &media_type).await
        } else {
            debug!(
                srs = %query.srs,
                grid = %grid.name(),
                "Query {}x{} in {} does not match grid, delegating",
                query.size.0, query.size.1, query.srs
            );
            self.delegate(query, grid.clone()).await
        }
    }

    async fn get_single_tile(
        &self,
        query: &MapQuery,
        resolved: &ResolvedTileset,
        media_type: &str,
    ) -> Result<MapResponse, SourceError> {
        let options = &self.inner.options;

        if let Some(res_range) = &options.res_range {
            if !res_range.contains(&query.bbox, query.size, &query.srs) {
                debug!(bbox = %query.bbox, "Query outside of resolution range");
                return Ok(MapResponse::Blank);
            }
        }

        if let Some(coverage) = &options.coverage {
            if !coverage.intersects(&query.bbox, &query.srs) {
                debug!(bbox = %query.bbox, "Query outside of coverage");
                return Ok(MapResponse::Blank);
            }
        }

        let affected = match resolved.grid.get_affected_tiles(&query.bbox, query.size) {
            Ok(affected) => affected,
            Err(GridError::OutOfBounds { .. }) => {
                debug!(bbox = %query.bbox, "Query outside of grid {}", resolved.grid.name());
                return Ok(MapResponse::Blank);
            }
            Err(e) => return Err(e.into()),
        };

        let tile = match affected.single_tile() {
            Some(tile) => tile,
            None => {
                debug!(
                    bbox = %query.bbox,
                    "Query spans {}x{} tiles, delegating to cache",
                    affected.grid_size.0,
                    affected.grid_size.1
                );
                return self.delegate(query, resolved.grid.clone()).await;
            }
        };

        let url = resolved.tile_url(tile);
        match self.inner.client.get(&url, Some(media_type)).await {
            Ok(resp) => Ok(MapResponse::Image(TileImage {
                data: resp.body,
                content_type: resp.content_type,
            })),
            Err(err) => {
                if let Some(handler) = &options.error_handler {
                    if let Some(response) = handler.handle(err.status(), query) {
                        debug!(url = %url, "Tile fetch failed ({}), using error handler response", err);
                        return Ok(response);
                    }
                }
                warn!(url = %url, "Cannot retrieve tile {}: {}", url, err);
                Err(SourceError::Transport(err))
            }
        }
    }

    async fn delegate(
        &self,
        query: &MapQuery,
        grid: Arc<TileGrid>,
    ) -> Result<MapResponse, SourceError> {
        let builder = self.inner.options.cache_builder.as_ref().ok_or_else(|| {
            SourceError::Delegation(format!(
                "no cache layer builder configured to serve {}x{} in {} from grid {}",
                query.size.0,
                query.size.1,
                query.srs,
                grid.name()
            ))
        })?;

        let config = CacheConfiguration::single(grid, Arc::new(self.clone()));
        let layer = builder.build_layer(config)?;
        layer.get_map(query).await
    }
}

#[async_trait]
impl MapLayer for OgcApiTilesSource {
    async fn get_map(&self, query: &MapQuery) -> Result<MapResponse, SourceError> {
        OgcApiTilesSource::get_map(self, query).await
    }
}

impl fmt::Debug for OgcApiTilesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OgcApiTilesSource")
            .field("landing", &self.inner.landing)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
