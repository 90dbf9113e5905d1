//! Tile grids built from OGC TileMatrixSet documents.
//!
//! # Supported documents
//!
//! Both the OGC API / TMS 2.0 JSON encoding (`id`, `crs`, `tileMatrices`,
//! `cellSize`, `pointOfOrigin`, `cornerOfOrigin`) and the older 1.0 spelling
//! (`identifier`, `supportedCRS`, `tileMatrix`, `topLeftCorner`) are accepted.
//! When `cellSize` is absent it is derived from `scaleDenominator` using the
//! standard 0.28mm pixel.
//!
//! # Tile addressing
//!
//! Tiles are addressed as `(x, y, z)` = (column, row, level index). Rows count
//! away from the corner of origin, which is the top-left corner unless the
//! matrix says `bottomLeft`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::GridError;
use crate::ogc::crs::{is_lat_lon_order, ogc_crs_url_to_auth_code};
use crate::ogc::{CrsRef, Srs};

/// Size of a "standardized rendering pixel" in metres.
pub const STANDARD_PIXEL_SIZE: f64 = 0.00028;

/// Metres per degree at the equator of the WGS84 ellipsoid.
pub const METERS_PER_DEGREE: f64 = 111_319.490_793_273_57;

/// Tolerance, in tile units, applied when snapping a bbox to tile boundaries.
const TILE_EPSILON: f64 = 1e-6;

// =============================================================================
// Bounding box
// =============================================================================

/// An axis-aligned bounding box in the units of its SRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Finite coordinates and a positive area.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.max_x > self.min_x
            && self.max_y > self.min_y
    }

    /// True if both boxes share an area (touching edges do not count).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl FromStr for BBox {
    type Err = String;

    /// Parse `minx,miny,maxx,maxy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bbox '{}': {}", s, e))?;

        match values.as_slice() {
            [min_x, min_y, max_x, max_y] => Ok(BBox::new(*min_x, *min_y, *max_x, *max_y)),
            _ => Err(format!("invalid bbox '{}': expected minx,miny,maxx,maxy", s)),
        }
    }
}

// =============================================================================
// TileMatrixSet JSON
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CornerOfOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

#[derive(Debug, Deserialize)]
struct TileMatrixSetDoc {
    #[serde(alias = "identifier")]
    id: Option<String>,

    #[serde(alias = "supportedCRS")]
    crs: Option<CrsRef>,

    #[serde(rename = "tileMatrices", alias = "tileMatrix", default)]
    tile_matrices: Vec<TileMatrixDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileMatrixDoc {
    #[serde(alias = "identifier")]
    id: String,

    scale_denominator: Option<f64>,

    cell_size: Option<f64>,

    #[serde(alias = "topLeftCorner")]
    point_of_origin: [f64; 2],

    #[serde(default)]
    corner_of_origin: CornerOfOrigin,

    tile_width: u32,

    tile_height: u32,

    matrix_width: u32,

    matrix_height: u32,
}

// =============================================================================
// Tile Grid
// =============================================================================

/// One zoom level of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMatrix {
    /// Identifier of the matrix in the tile matrix set
    pub id: String,

    /// Size of one pixel in SRS units
    pub resolution: f64,

    /// Corner of origin, x/y axis order
    pub origin: (f64, f64),

    pub corner: CornerOfOrigin,

    /// Number of tile columns
    pub matrix_width: u32,

    /// Number of tile rows
    pub matrix_height: u32,
}

/// Coordinates of one tile: column, row and level index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Tiles needed to render a bbox.
#[derive(Debug, Clone, PartialEq)]
pub struct AffectedTiles {
    /// Area covered by the returned tiles
    pub bbox: BBox,

    /// Number of tile columns and rows spanned by the request, including
    /// those outside of the matrix
    pub grid_size: (u32, u32),

    /// Tiles, row by row from top to bottom
    pub tiles: Vec<TileCoord>,
}

impl AffectedTiles {
    /// The tile, when exactly one 1x1 tile is affected.
    pub fn single_tile(&self) -> Option<TileCoord> {
        match (self.grid_size, self.tiles.as_slice()) {
            ((1, 1), [tile]) => Some(*tile),
            _ => None,
        }
    }
}

/// A tile grid: SRS, tile pixel size and zoom levels.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    name: String,
    srs: Srs,
    tile_size: (u32, u32),
    levels: Vec<TileMatrix>,
}

impl TileGrid {
    /// Build a grid from explicit levels. Levels are expected from coarse to fine.
    pub fn new(
        name: impl Into<String>,
        srs: Srs,
        tile_size: (u32, u32),
        levels: Vec<TileMatrix>,
    ) -> Result<Self, GridError> {
        if levels.is_empty() {
            return Err(GridError::NoTileMatrices);
        }
        for level in &levels {
            if !level.resolution.is_finite() || level.resolution <= 0.0 {
                return Err(GridError::InvalidCellSize {
                    id: level.id.clone(),
                    cell_size: level.resolution,
                });
            }
        }

        Ok(Self {
            name: name.into(),
            srs,
            tile_size,
            levels,
        })
    }

    /// Build a grid from an OGC TileMatrixSet JSON document.
    pub fn from_tile_matrix_set(doc: &Value) -> Result<Self, GridError> {
        let tms = TileMatrixSetDoc::deserialize(doc)
            .map_err(|e| GridError::InvalidDocument(e.to_string()))?;

        let crs = tms
            .crs
            .ok_or_else(|| GridError::InvalidDocument("missing crs".to_string()))?;
        let auth_code = ogc_crs_url_to_auth_code(crs.uri());
        let swap_axes = is_lat_lon_order(&auth_code);
        let srs = Srs::new(&auth_code);

        let meters_per_unit = if srs.is_geographic() {
            METERS_PER_DEGREE
        } else {
            1.0
        };

        let first = tms.tile_matrices.first().ok_or(GridError::NoTileMatrices)?;
        let tile_size = (first.tile_width, first.tile_height);

        let mut levels = Vec::with_capacity(tms.tile_matrices.len());
        for matrix in &tms.tile_matrices {
            let found = (matrix.tile_width, matrix.tile_height);
            if found != tile_size {
                return Err(GridError::InconsistentTileSize {
                    id: matrix.id.clone(),
                    expected: tile_size,
                    found,
                });
            }

            let resolution = match (matrix.cell_size, matrix.scale_denominator) {
                (Some(cell_size), _) => cell_size,
                (None, Some(scale)) => scale * STANDARD_PIXEL_SIZE / meters_per_unit,
                (None, None) => {
                    return Err(GridError::InvalidDocument(format!(
                        "tile matrix {} has neither cellSize nor scaleDenominator",
                        matrix.id
                    )))
                }
            };

            let [a, b] = matrix.point_of_origin;
            let origin = if swap_axes { (b, a) } else { (a, b) };

            levels.push(TileMatrix {
                id: matrix.id.clone(),
                resolution,
                origin,
                corner: matrix.corner_of_origin,
                matrix_width: matrix.matrix_width,
                matrix_height: matrix.matrix_height,
            });
        }

        let name = tms
            .id
            .unwrap_or_else(|| format!("ogcapi_{}", srs.code().replace(':', "_")));

        Self::new(name, srs, tile_size, levels)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn srs(&self) -> &Srs {
        &self.srs
    }

    /// Tile size in pixels (width, height).
    pub fn tile_size(&self) -> (u32, u32) {
        self.tile_size
    }

    pub fn levels(&self) -> &[TileMatrix] {
        &self.levels
    }

    /// Index of the level whose resolution is closest to `res`.
    pub fn closest_level(&self, res: f64) -> usize {
        let mut best = 0;
        let mut best_diff = f64::INFINITY;
        for (idx, level) in self.levels.iter().enumerate() {
            let diff = (level.resolution / res).ln().abs();
            if diff < best_diff {
                best = idx;
                best_diff = diff;
            }
        }
        best
    }

    /// Area covered by one tile.
    pub fn tile_bbox(&self, tile: TileCoord) -> Option<BBox> {
        let level = self.levels.get(tile.z as usize)?;
        let (span_x, span_y) = self.tile_span(level);
        let (ox, oy) = level.origin;

        let min_x = ox + tile.x as f64 * span_x;
        let max_x = min_x + span_x;
        let bbox = match level.corner {
            CornerOfOrigin::TopLeft => {
                let max_y = oy - tile.y as f64 * span_y;
                BBox::new(min_x, max_y - span_y, max_x, max_y)
            }
            CornerOfOrigin::BottomLeft => {
                let min_y = oy + tile.y as f64 * span_y;
                BBox::new(min_x, min_y, max_x, min_y + span_y)
            }
        };
        Some(bbox)
    }

    /// Tiles needed to render `bbox` at `size` pixels.
    ///
    /// The level closest to the requested resolution is used. Tiles outside of
    /// the matrix are left out of `tiles` but still counted in `grid_size`; a
    /// bbox that touches no tile at all is an [`GridError::OutOfBounds`] error.
    pub fn get_affected_tiles(
        &self,
        bbox: &BBox,
        size: (u32, u32),
    ) -> Result<AffectedTiles, GridError> {
        if !bbox.is_valid() {
            return Err(GridError::InvalidRequest(format!("invalid bbox {}", bbox)));
        }
        if size.0 == 0 || size.1 == 0 {
            return Err(GridError::InvalidRequest(format!(
                "invalid size {}x{}",
                size.0, size.1
            )));
        }

        let res = (bbox.width() / size.0 as f64).max(bbox.height() / size.1 as f64);
        let z = self.closest_level(res);
        let level = &self.levels[z];
        let (span_x, span_y) = self.tile_span(level);
        let (ox, oy) = level.origin;

        let (col_min, col_max) = tile_range(bbox.min_x - ox, bbox.max_x - ox, span_x);
        let (row_min, row_max) = match level.corner {
            CornerOfOrigin::TopLeft => tile_range(oy - bbox.max_y, oy - bbox.min_y, span_y),
            CornerOfOrigin::BottomLeft => tile_range(bbox.min_y - oy, bbox.max_y - oy, span_y),
        };

        let width = level.matrix_width as i64;
        let height = level.matrix_height as i64;
        if col_max < 0 || row_max < 0 || col_min >= width || row_min >= height {
            return Err(GridError::OutOfBounds {
                grid: self.name.clone(),
            });
        }

        let grid_size = ((col_max - col_min + 1) as u32, (row_max - row_min + 1) as u32);

        let col_min = col_min.max(0) as u32;
        let col_max = col_max.min(width - 1) as u32;
        let row_min = row_min.max(0) as u32;
        let row_max = row_max.min(height - 1) as u32;

        let rows: Vec<u32> = match level.corner {
            CornerOfOrigin::TopLeft => (row_min..=row_max).collect(),
            CornerOfOrigin::BottomLeft => (row_min..=row_max).rev().collect(),
        };

        let mut tiles = Vec::with_capacity(rows.len() * (col_max - col_min + 1) as usize);
        for &y in &rows {
            for x in col_min..=col_max {
                tiles.push(TileCoord::new(x, y, z as u32));
            }
        }

        let z = z as u32;
        let first = self.tile_bbox(TileCoord::new(col_min, row_min, z));
        let last = self.tile_bbox(TileCoord::new(col_max, row_max, z));
        let covered = match (first, last) {
            (Some(a), Some(b)) => BBox::new(
                a.min_x.min(b.min_x),
                a.min_y.min(b.min_y),
                a.max_x.max(b.max_x),
                a.max_y.max(b.max_y),
            ),
            _ => *bbox,
        };

        Ok(AffectedTiles {
            bbox: covered,
            grid_size,
            tiles,
        })
    }

    fn tile_span(&self, level: &TileMatrix) -> (f64, f64) {
        (
            level.resolution * self.tile_size.0 as f64,
            level.resolution * self.tile_size.1 as f64,
        )
    }
}

/// Inclusive range of tile indices covering `[start, end]` (offsets from the origin).
fn tile_range(start: f64, end: f64, span: f64) -> (i64, i64) {
    let first = (start / span + TILE_EPSILON).floor() as i64;
    let last = (end / span - TILE_EPSILON).ceil() as i64 - 1;
    (first, last.max(first))
}
