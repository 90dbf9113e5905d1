//! Resolution of a (CRS, media type) pair into a grid and a tile URL template.
//!
//! # Candidate order
//!
//! Tilesets of the requested CRS are tried in catalog order. When the catalog
//! has no tileset in that CRS at all, every tileset is tried, bucket after
//! bucket; the grid returned then lives in another CRS and the query is answered
//! by the cache subsystem.
//!
//! # Caching
//!
//! Each `{srs}/{media type}` key owns a once-cell. Concurrent callers for the
//! same key wait for the first resolution instead of repeating its requests;
//! different keys resolve independently. Failures are not cached.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info};

use super::fetch::fetch_json;
use crate::error::SourceError;
use crate::grid::{TileCoord, TileGrid};
use crate::io::{HttpClient, JSON_MEDIA_TYPE};
use crate::ogc::{
    find_href, parse_links, LandingPage, Srs, TilesetDescriptor, TilesetsByCrs, REL_ITEM,
    REL_SELF, REL_TILING_SCHEME,
};

/// A grid and the URL template its tiles are fetched from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTileset {
    pub grid: Arc<TileGrid>,
    pub template: String,
}

impl ResolvedTileset {
    /// URL of one tile.
    pub fn tile_url(&self, tile: TileCoord) -> String {
        build_tile_url(&self.template, tile)
    }
}

/// Substitute `{tileMatrix}`, `{tileRow}` and `{tileCol}` in a URL template.
///
/// Other template variables are left untouched.
pub fn build_tile_url(template: &str, tile: TileCoord) -> String {
    template
        .replace("{tileMatrix}", &tile.z.to_string())
        .replace("{tileRow}", &tile.y.to_string())
        .replace("{tileCol}", &tile.x.to_string())
}

/// Resolves and caches tilesets per (CRS, media type).
pub struct TilesetResolver {
    landing: LandingPage,
    client: Arc<dyn HttpClient>,
    cache: Mutex<HashMap<String, Arc<OnceCell<ResolvedTileset>>>>,
}

impl TilesetResolver {
    pub fn new(landing: LandingPage, client: Arc<dyn HttpClient>) -> Self {
        Self {
            landing,
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Grid and template for `srs` and `media_type`, resolving them on first use.
    pub async fn resolve(
        &self,
        tilesets: &TilesetsByCrs,
        srs: &Srs,
        media_type: &str,
    ) -> Result<ResolvedTileset, SourceError> {
        let key = format!("{}/{}", srs.code(), media_type);

        let cell = {
            let mut cache = self.cache.lock().await;
            cache.entry(key).or_default().clone()
        };

        let resolved = cell
            .get_or_try_init(|| self.resolve_uncached(tilesets, srs, media_type))
            .await?;
        Ok(resolved.clone())
    }

    /// Number of keys resolved so far.
    pub async fn cached_count(&self) -> usize {
        let cache = self.cache.lock().await;
        cache.values().filter(|cell| cell.initialized()).count()
    }

    async fn resolve_uncached(
        &self,
        tilesets: &TilesetsByCrs,
        srs: &Srs,
        media_type: &str,
    ) -> Result<ResolvedTileset, SourceError> {
        let candidates: Vec<&TilesetDescriptor> = match tilesets.get(srs) {
            Some(bucket) => bucket.iter().collect(),
            None => {
                info!(
                    srs = %srs,
                    "No tileset in {}, trying tilesets of every other CRS", srs
                );
                tilesets.all().collect()
            }
        };

        let mut failures = Vec::new();
        for tileset in &candidates {
            match self.resolve_one(tileset, media_type).await {
                Ok(resolved) => {
                    debug!(
                        srs = %srs,
                        grid = %resolved.grid.name(),
                        skipped = failures.len(),
                        "Resolved {} to {}", tileset, resolved.template
                    );
                    return Ok(resolved);
                }
                Err(err) => {
                    info!("Exception while evaluating tileset {}: {}", tileset, err);
                    failures.push(err);
                }
            }
        }

        let err = SourceError::Resolution {
            srs: srs.to_string(),
            tried: candidates.len(),
        };
        error!(media_type = %media_type, failures = failures.len(), "{}", err);
        Err(err)
    }

    /// Grid and template of a single tileset.
    ///
    /// Follows the `tiling-scheme` link to build the grid, then the `self` link
    /// to find the `item` template for `media_type`.
    pub async fn resolve_one(
        &self,
        tileset: &TilesetDescriptor,
        media_type: &str,
    ) -> Result<ResolvedTileset, SourceError> {
        let links = &tileset.links;
        let self_url = find_href(links, REL_SELF, JSON_MEDIA_TYPE)
            .map(|href| self.landing.resolve_href(href));
        let context = self_url
            .clone()
            .unwrap_or_else(|| self.landing.collection_url());

        let tiling_scheme_url = find_href(links, REL_TILING_SCHEME, JSON_MEDIA_TYPE)
            .map(|href| self.landing.resolve_href(href))
            .ok_or_else(|| {
                SourceError::protocol(
                    &context,
                    format!("could not retrieve a 'tiling-scheme' link for tileset {}", tileset),
                )
            })?;

        let self_url = self_url.ok_or_else(|| {
            SourceError::protocol(
                &context,
                format!("could not retrieve a 'self' link for tileset {}", tileset),
            )
        })?;

        let tile_matrix_set = fetch_json(self.client.as_ref(), &tiling_scheme_url).await?;
        let grid = TileGrid::from_tile_matrix_set(&tile_matrix_set)?;

        let tileset_doc = fetch_json(self.client.as_ref(), &self_url).await?;
        let tileset_links = parse_links(&tileset_doc).ok_or_else(|| {
            SourceError::protocol(&self_url, "could not retrieve 'links' in response")
        })?;

        let template_href = find_href(&tileset_links, REL_ITEM, media_type).ok_or_else(|| {
            SourceError::protocol(
                &self_url,
                format!("could not retrieve a {} tile template URL", media_type),
            )
        })?;

        Ok(ResolvedTileset {
            grid: Arc::new(grid),
            template: self.landing.resolve_href(template_href),
        })
    }
}
