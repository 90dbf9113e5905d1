//! Tile grids and query gates.
//!
//! - [`TileGrid`]: built from an OGC TileMatrixSet document, maps a bbox and
//!   pixel size onto tile coordinates
//! - [`Coverage`] / [`BBoxCoverage`]: spatial gate
//! - [`ResolutionRange`]: resolution gate

mod coverage;
mod tile_grid;

pub use coverage::{BBoxCoverage, Coverage, ResolutionRange};
pub use tile_grid::{
    AffectedTiles, BBox, CornerOfOrigin, TileCoord, TileGrid, TileMatrix, METERS_PER_DEGREE,
    STANDARD_PIXEL_SIZE,
};
