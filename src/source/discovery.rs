//! One-time discovery of the map tilesets of a landing page.
//!
//! Discovery performs two requests:
//!
//! 1. GET the collection resource (or the landing page itself) and find its
//!    `tilesets-map` link
//! 2. GET the tilesets list and group its map tilesets by CRS
//!
//! The result is shared by every later resolution. Concurrent callers are
//! serialized on a single lock, so the two requests happen once no matter how
//! many tasks ask at the same time.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use super::fetch::fetch_json;
use crate::error::SourceError;
use crate::io::{HttpClient, JSON_MEDIA_TYPE};
use crate::ogc::{find_href, parse_links, LandingPage, TilesetsByCrs, REL_TILESETS_MAP};

/// What to do on the next call after a failed discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryRetry {
    /// Run discovery again
    #[default]
    Retry,

    /// Return the first failure forever, without new requests
    Latch,
}

#[derive(Debug)]
enum DiscoveryState {
    Pending,
    Ready(Arc<TilesetsByCrs>),
    Failed(SourceError),
}

/// Runs discovery at most once and remembers its outcome.
pub struct Discoverer {
    landing: LandingPage,
    client: Arc<dyn HttpClient>,
    retry: DiscoveryRetry,
    state: Mutex<DiscoveryState>,
}

impl Discoverer {
    pub fn new(landing: LandingPage, client: Arc<dyn HttpClient>, retry: DiscoveryRetry) -> Self {
        Self {
            landing,
            client,
            retry,
            state: Mutex::new(DiscoveryState::Pending),
        }
    }

    /// Map tilesets grouped by CRS, discovering them on first use.
    pub async fn discover(&self) -> Result<Arc<TilesetsByCrs>, SourceError> {
        let mut state = self.state.lock().await;

        match &*state {
            DiscoveryState::Ready(tilesets) => return Ok(tilesets.clone()),
            DiscoveryState::Failed(err) if self.retry == DiscoveryRetry::Latch => {
                return Err(err.clone());
            }
            DiscoveryState::Failed(_) | DiscoveryState::Pending => {}
        }

        match self.fetch_tilesets().await {
            Ok(tilesets) => {
                info!(
                    url = %self.landing.collection_url(),
                    "Discovered {} map tileset(s) in {} CRS(s)",
                    tilesets.len(),
                    tilesets.crs_count()
                );
                let tilesets = Arc::new(tilesets);
                *state = DiscoveryState::Ready(tilesets.clone());
                Ok(tilesets)
            }
            Err(err) => {
                *state = DiscoveryState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Whether discovery already succeeded.
    pub async fn is_ready(&self) -> bool {
        matches!(&*self.state.lock().await, DiscoveryState::Ready(_))
    }

    async fn fetch_tilesets(&self) -> Result<TilesetsByCrs, SourceError> {
        let url = self.landing.collection_url();
        let doc = fetch_json(self.client.as_ref(), &url).await?;

        let links = parse_links(&doc).ok_or_else(|| {
            let err = SourceError::protocol(&url, "could not retrieve 'links' in response");
            error!("{}", err);
            err
        })?;

        let tilesets_href =
            find_href(&links, REL_TILESETS_MAP, JSON_MEDIA_TYPE).ok_or_else(|| {
                let err = SourceError::protocol(&url, "missing tilesets-map link");
                error!("{}", err);
                err
            })?;

        let tilesets_url = self.landing.resolve_href(tilesets_href);
        let doc = fetch_json(self.client.as_ref(), &tilesets_url).await?;

        let entries = doc
            .get("tilesets")
            .and_then(|t| t.as_array())
            .ok_or_else(|| {
                let err =
                    SourceError::protocol(&tilesets_url, "could not retrieve 'tilesets' in response");
                error!("{}", err);
                err
            })?;

        Ok(TilesetsByCrs::from_catalog(entries))
    }
}
