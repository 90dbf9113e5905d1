//! Tileset descriptors of a `tilesets-map` response, grouped by CRS.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::crs::Srs;
use super::links::Link;

/// Only tilesets of this data type are kept.
pub const MAP_DATA_TYPE: &str = "map";

/// CRS of a tileset: a URI string or an object carrying one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CrsRef {
    Uri(String),
    Object { uri: String },
}

impl CrsRef {
    pub fn uri(&self) -> &str {
        match self {
            CrsRef::Uri(uri) => uri,
            CrsRef::Object { uri } => uri,
        }
    }
}

/// One entry of the `tilesets` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TilesetDescriptor {
    #[serde(rename = "dataType")]
    pub data_type: String,

    pub crs: CrsRef,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(rename = "tileMatrixSetURI", default)]
    pub tile_matrix_set_uri: Option<String>,
}

impl TilesetDescriptor {
    /// Normalized SRS of this tileset.
    pub fn srs(&self) -> Srs {
        Srs::from_ogc_crs(self.crs.uri())
    }
}

impl fmt::Display for TilesetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.title, &self.tile_matrix_set_uri) {
            (Some(title), _) => write!(f, "'{}' ({})", title, self.crs.uri()),
            (None, Some(tms)) => write!(f, "{} ({})", tms, self.crs.uri()),
            (None, None) => write!(f, "tileset in {}", self.crs.uri()),
        }
    }
}

/// Map tilesets grouped by normalized CRS.
///
/// Buckets keep the order in which their CRS first appears in the catalog and
/// tilesets keep catalog order within a bucket; resolution relies on both.
#[derive(Debug, Clone, Default)]
pub struct TilesetsByCrs {
    buckets: Vec<(Srs, Vec<TilesetDescriptor>)>,
}

impl TilesetsByCrs {
    /// Group the entries of a `tilesets` array.
    ///
    /// Entries that are not `"map"` tilesets are dropped; entries that cannot be
    /// parsed are logged and skipped.
    pub fn from_catalog(entries: &[Value]) -> Self {
        let mut grouped = Self::default();

        for entry in entries {
            let tileset = match TilesetDescriptor::deserialize(entry) {
                Ok(tileset) => tileset,
                Err(e) => {
                    warn!("Skipping malformed tileset description: {}", e);
                    continue;
                }
            };

            if tileset.data_type != MAP_DATA_TYPE {
                debug!(
                    data_type = %tileset.data_type,
                    "Skipping non-map tileset {}", tileset
                );
                continue;
            }

            grouped.push(tileset);
        }

        grouped
    }

    fn push(&mut self, tileset: TilesetDescriptor) {
        let srs = tileset.srs();
        match self.buckets.iter_mut().find(|(s, _)| *s == srs) {
            Some((_, bucket)) => bucket.push(tileset),
            None => self.buckets.push((srs, vec![tileset])),
        }
    }

    /// Tilesets of one CRS, in catalog order.
    pub fn get(&self, srs: &Srs) -> Option<&[TilesetDescriptor]> {
        self.buckets
            .iter()
            .find(|(s, _)| s == srs)
            .map(|(_, bucket)| bucket.as_slice())
    }

    /// Iterate over `(srs, tilesets)` buckets in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&Srs, &[TilesetDescriptor])> {
        self.buckets
            .iter()
            .map(|(srs, bucket)| (srs, bucket.as_slice()))
    }

    /// Every tileset, bucket after bucket.
    pub fn all(&self) -> impl Iterator<Item = &TilesetDescriptor> {
        self.buckets.iter().flat_map(|(_, bucket)| bucket.iter())
    }

    /// Number of distinct CRSs.
    pub fn crs_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of map tilesets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
