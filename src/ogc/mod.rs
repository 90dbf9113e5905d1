//! OGC API documents: landing page, links, CRS identifiers and tilesets.
//!
//! These types model the parts of the OGC API Tiles resources that the source
//! navigates:
//!
//! ```text
//! landing page / collection ──tilesets-map──▶ tilesets list
//!                                                 │
//!                              ┌──────────────────┴─────────────────┐
//!                              ▼                                    ▼
//!                    tiling-scheme (TMS JSON)          self (tileset document)
//!                                                                   │
//!                                                                 item
//!                                                                   ▼
//!                                                    tiles/{tileMatrix}/{tileRow}/{tileCol}
//! ```

pub mod crs;
mod landing;
mod links;
mod tileset;

pub use crs::{normalize_srs_code, ogc_crs_url_to_auth_code, Srs, EPSG_4326, OGC_CRS84};
pub use landing::LandingPage;
pub use links::{
    find_href, parse_links, Link, REL_ITEM, REL_SELF, REL_TILESETS_MAP, REL_TILING_SCHEME,
};
pub use tileset::{CrsRef, TilesetDescriptor, TilesetsByCrs, MAP_DATA_TYPE};
