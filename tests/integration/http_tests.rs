//! HTTP transport integration tests.
//!
//! A local axum server plays the OGC API service; the source talks to it
//! through [`ReqwestHttpClient`].

use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use serde_json::Value;

use ogcapi_tiles_source::io::{HttpClient, ReqwestHttpClient};
use ogcapi_tiles_source::{
    IoError, LandingPage, MapQuery, OgcApiTilesSource, SourceOptions, Srs, TileCoord, TileGrid,
};

use super::test_utils::{
    collection_doc, map_tileset, tileset_self_doc, tilesets_doc, web_mercator_quad,
    EPSG_3857_URI, MERCATOR_TEMPLATE, TILE_BYTES,
};

// =============================================================================
// Test Server
// =============================================================================

fn json_route(doc: Value) -> MethodRouter {
    get(move || {
        let doc = doc.clone();
        async move { Json(doc) }
    })
}

async fn tile_handler(
    Path((z, y, file)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    if accept != Some("image/png") {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }
    if (z.as_str(), y.as_str(), file.as_str()) == ("2", "0", "0.png") {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], TILE_BYTES).into_response()
}

async fn echo_accept(headers: HeaderMap) -> String {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Start the service on an ephemeral port and return its landing page URL.
async fn spawn_service() -> String {
    let app = Router::new()
        .route(
            "/ogcapi/collections/blueMarble",
            json_route(collection_doc("/ogcapi/collections/blueMarble/map/tiles")),
        )
        .route(
            "/ogcapi/collections/blueMarble/map/tiles",
            json_route(tilesets_doc(vec![map_tileset(
                "Blue Marble",
                EPSG_3857_URI,
                "/ogcapi/tileMatrixSets/WebMercatorQuad",
                "/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad",
            )])),
        )
        .route(
            "/ogcapi/tileMatrixSets/WebMercatorQuad",
            json_route(web_mercator_quad(4)),
        )
        .route(
            "/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad",
            json_route(tileset_self_doc(MERCATOR_TEMPLATE)),
        )
        .route(
            "/ogcapi/collections/blueMarble/map/tiles/WebMercatorQuad/{z}/{y}/{file}",
            get(tile_handler),
        )
        .route("/echo-accept", get(echo_accept));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/ogcapi", addr)
}

fn tile_query(tile: TileCoord) -> MapQuery {
    let grid = TileGrid::from_tile_matrix_set(&web_mercator_quad(4)).unwrap();
    MapQuery::new(
        grid.tile_bbox(tile).unwrap(),
        (256, 256),
        Srs::new("EPSG:3857"),
        "png",
    )
}

async fn live_source() -> OgcApiTilesSource {
    let landing = spawn_service().await;
    let landing = LandingPage::new(&landing, Some("blueMarble")).unwrap();
    let client = Arc::new(ReqwestHttpClient::new().unwrap());
    OgcApiTilesSource::new(landing, client, SourceOptions::default())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_round_trip_through_reqwest() {
    let source = live_source().await;

    let tilesets = source.discover().await.unwrap();
    assert_eq!(tilesets.len(), 1);

    let resolved = source.resolve(&Srs::new("EPSG:3857"), "image/png").await.unwrap();
    assert!(resolved.template.starts_with(source.landing_page().url()));
    assert!(resolved.template.ends_with("/{tileMatrix}/{tileRow}/{tileCol}.png"));

    let response = source
        .get_map(&tile_query(TileCoord::new(1, 1, 2)))
        .await
        .unwrap();
    let image = response.image().unwrap();
    assert_eq!(image.data.as_ref(), TILE_BYTES);
    assert_eq!(image.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_missing_tile_carries_status() {
    let source = live_source().await;

    let err = source
        .get_map(&tile_query(TileCoord::new(0, 0, 2)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_client_sends_accept_header() {
    let landing = spawn_service().await;
    let base = landing.trim_end_matches("/ogcapi");
    let client = ReqwestHttpClient::new().unwrap();

    let resp = client
        .get(&format!("{}/echo-accept", base), Some("application/json"))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.as_ref(), b"application/json");

    match client.get(&format!("{}/nowhere", base), None).await {
        Err(IoError::Status { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/nowhere"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}
