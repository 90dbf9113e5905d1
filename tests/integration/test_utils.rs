//! Test utilities for integration tests.
//!
//! This module provides a scripted HTTP client with request tracking and
//! builders for the OGC API documents a service returns.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use ogcapi_tiles_source::error::IoError;
use ogcapi_tiles_source::io::{HttpClient, HttpResponse};
use ogcapi_tiles_source::{LandingPage, OgcApiTilesSource, SourceOptions};

// =============================================================================
// Constants
// =============================================================================

pub const LANDING: &str = "https://maps.example.org/ogcapi";
pub const COLLECTION: &str = "blueMarble";
pub const COLLECTION_URL: &str = "https://maps.example.org/ogcapi/collections/blueMarble";
pub const TILESETS_URL: &str = "https://maps.example.org/ogcapi/collections/blueMarble/map/tiles";

pub const MERCATOR_TMS_URL: &str = "https://maps.example.org/ogcapi/tileMatrixSets/WebMercatorQuad";
pub const CRS84_TMS_URL: &str = "https://maps.example.org/ogcapi/tileMatrixSets/WorldCRS84Quad";
pub const MERCATOR_TILESET_URL: &str =
    "https://maps.example.org/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad";
pub const CRS84_TILESET_URL: &str =
    "https://maps.example.org/ogcapi/collections/blueMarble/map/tiles/WorldCRS84Quad";

pub const EPSG_3857_URI: &str = "http://www.opengis.net/def/crs/EPSG/0/3857";
pub const CRS84_URI: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

pub const REL_TILESETS_MAP: &str = "http://www.opengis.net/def/rel/ogc/1.0/tilesets-map";
pub const REL_TILING_SCHEME: &str = "http://www.opengis.net/def/rel/ogc/1.0/tiling-scheme";

pub const WEB_MERCATOR_EXTENT: f64 = 20_037_508.342_789_244;
pub const WEB_MERCATOR_Z0_RES: f64 = 156_543.033_928_041;

/// Bytes served for every tile.
pub const TILE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake tile";

// =============================================================================
// Mock HTTP Client with Request Tracking
// =============================================================================

/// What the mock answers for a URL.
#[derive(Debug, Clone)]
pub enum MockRoute {
    Json(Value),
    Body { body: Bytes, content_type: String },
    Status(u16),
}

/// A scripted HTTP client that tracks every request.
///
/// URLs that were not scripted answer 404.
pub struct MockHttpClient {
    routes: RwLock<HashMap<String, MockRoute>>,
    prefix_routes: RwLock<Vec<(String, MockRoute)>>,
    delay: Option<Duration>,
    request_count: AtomicUsize,
    requests: RwLock<Vec<(String, Option<String>)>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            prefix_routes: RwLock::new(Vec::new()),
            delay: None,
            request_count: AtomicUsize::new(0),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_json(self, url: &str, doc: Value) -> Self {
        self.with_route(url, MockRoute::Json(doc))
    }

    pub fn with_route(mut self, url: &str, route: MockRoute) -> Self {
        self.routes.get_mut().insert(url.to_string(), route);
        self
    }

    /// Answer `route` for every URL starting with `prefix`.
    pub fn with_prefix(mut self, prefix: &str, route: MockRoute) -> Self {
        self.prefix_routes.get_mut().push((prefix.to_string(), route));
        self
    }

    /// Replace the answer for `url` on an already shared client.
    pub async fn set_route(&self, url: &str, route: MockRoute) {
        self.routes.write().await.insert(url.to_string(), route);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.read().await.clone()
    }

    /// Number of requests made for `url`.
    pub async fn count_for(&self, url: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|(u, _)| u == url)
            .count()
    }

    /// Number of requests whose URL starts with `prefix`.
    pub async fn count_with_prefix(&self, prefix: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|(u, _)| u.starts_with(prefix))
            .count()
    }

    pub fn reset_tracking(&self) {
        self.request_count.store(0, Ordering::SeqCst);
    }

    async fn route_for(&self, url: &str) -> Option<MockRoute> {
        if let Some(route) = self.routes.read().await.get(url) {
            return Some(route.clone());
        }
        self.prefix_routes
            .read()
            .await
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, route)| route.clone())
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, accept: Option<&str>) -> Result<HttpResponse, IoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .write()
            .await
            .push((url.to_string(), accept.map(|a| a.to_string())));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.route_for(url).await {
            Some(MockRoute::Json(doc)) => Ok(HttpResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: Bytes::from(doc.to_string()),
            }),
            Some(MockRoute::Body { body, content_type }) => Ok(HttpResponse {
                status: 200,
                content_type: Some(content_type),
                body,
            }),
            Some(MockRoute::Status(status)) => Err(IoError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(IoError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

// =============================================================================
// Document Builders
// =============================================================================

/// A collection (or landing page) document pointing at `tilesets_href`.
pub fn collection_doc(tilesets_href: &str) -> Value {
    json!({
        "id": COLLECTION,
        "links": [
            { "rel": "self", "type": "application/json", "href": COLLECTION_URL },
            { "rel": REL_TILESETS_MAP, "type": "text/html", "href": format!("{}?f=html", tilesets_href) },
            { "rel": REL_TILESETS_MAP, "type": "application/json", "href": tilesets_href }
        ]
    })
}

/// A tilesets list with the given entries.
pub fn tilesets_doc(entries: Vec<Value>) -> Value {
    json!({ "tilesets": entries })
}

/// One `map` tileset entry.
pub fn map_tileset(title: &str, crs: &str, tms_href: &str, self_href: &str) -> Value {
    json!({
        "title": title,
        "dataType": "map",
        "crs": crs,
        "links": [
            { "rel": "self", "type": "application/json", "href": self_href },
            { "rel": REL_TILING_SCHEME, "type": "application/json", "href": tms_href }
        ]
    })
}

/// A tileset document offering `png_template` for `image/png`.
pub fn tileset_self_doc(png_template: &str) -> Value {
    json!({
        "dataType": "map",
        "links": [
            { "rel": "item", "type": "image/jpeg", "href": png_template.replace(".png", ".jpg") },
            { "rel": "item", "type": "image/png", "href": png_template }
        ]
    })
}

/// The WebMercatorQuad tile matrix set, levels 0 to `max_zoom`.
pub fn web_mercator_quad(max_zoom: u32) -> Value {
    let matrices: Vec<Value> = (0..=max_zoom)
        .map(|z| {
            json!({
                "id": z.to_string(),
                "scaleDenominator": 559_082_264.028_717_8 / 2f64.powi(z as i32),
                "cellSize": WEB_MERCATOR_Z0_RES / 2f64.powi(z as i32),
                "cornerOfOrigin": "topLeft",
                "pointOfOrigin": [-WEB_MERCATOR_EXTENT, WEB_MERCATOR_EXTENT],
                "tileWidth": 256,
                "tileHeight": 256,
                "matrixWidth": 1u32 << z,
                "matrixHeight": 1u32 << z
            })
        })
        .collect();

    json!({
        "id": "WebMercatorQuad",
        "crs": EPSG_3857_URI,
        "tileMatrices": matrices
    })
}

/// The WorldCRS84Quad tile matrix set, levels 0 to `max_zoom`.
pub fn world_crs84_quad(max_zoom: u32) -> Value {
    let matrices: Vec<Value> = (0..=max_zoom)
        .map(|z| {
            json!({
                "id": z.to_string(),
                "cellSize": 0.703_125 / 2f64.powi(z as i32),
                "pointOfOrigin": [-180.0, 90.0],
                "tileWidth": 256,
                "tileHeight": 256,
                "matrixWidth": 2u32 << z,
                "matrixHeight": 1u32 << z
            })
        })
        .collect();

    json!({
        "id": "WorldCRS84Quad",
        "crs": CRS84_URI,
        "tileMatrices": matrices
    })
}

/// Root-relative template of the WebMercatorQuad tiles.
pub const MERCATOR_TEMPLATE: &str =
    "/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad/{tileMatrix}/{tileRow}/{tileCol}.png";

/// Absolute prefix of every WebMercatorQuad tile URL.
pub const MERCATOR_TILE_PREFIX: &str =
    "https://maps.example.org/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad/";

/// Absolute template of the WorldCRS84Quad tiles.
pub const CRS84_TEMPLATE: &str =
    "https://maps.example.org/ogcapi/collections/blueMarble/map/tiles/WorldCRS84Quad/{tileMatrix}/{tileRow}/{tileCol}.png";

/// A service publishing a WebMercatorQuad and a WorldCRS84Quad tileset.
///
/// Hrefs are a mix of root-relative and absolute, as real services do.
pub fn standard_service() -> MockHttpClient {
    MockHttpClient::new()
        .with_json(
            COLLECTION_URL,
            collection_doc("/ogcapi/collections/blueMarble/map/tiles"),
        )
        .with_json(
            TILESETS_URL,
            tilesets_doc(vec![
                map_tileset(
                    "Blue Marble (WebMercatorQuad)",
                    EPSG_3857_URI,
                    "/ogcapi/tileMatrixSets/WebMercatorQuad",
                    "/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad",
                ),
                map_tileset(
                    "Blue Marble (WorldCRS84Quad)",
                    CRS84_URI,
                    CRS84_TMS_URL,
                    CRS84_TILESET_URL,
                ),
            ]),
        )
        .with_json(MERCATOR_TMS_URL, web_mercator_quad(5))
        .with_json(CRS84_TMS_URL, world_crs84_quad(4))
        .with_json(MERCATOR_TILESET_URL, tileset_self_doc(MERCATOR_TEMPLATE))
        .with_json(CRS84_TILESET_URL, tileset_self_doc(CRS84_TEMPLATE))
        .with_prefix(
            MERCATOR_TILE_PREFIX,
            MockRoute::Body {
                body: Bytes::from_static(TILE_BYTES),
                content_type: "image/png".to_string(),
            },
        )
}

pub fn landing() -> LandingPage {
    LandingPage::new(LANDING, Some(COLLECTION)).unwrap()
}

/// A source over `client` with the given options.
pub fn source_with(client: Arc<MockHttpClient>, options: SourceOptions) -> OgcApiTilesSource {
    OgcApiTilesSource::new(landing(), client, options)
}
