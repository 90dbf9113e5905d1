//! Gates applied to map queries before tiles are fetched.

use std::fmt;

use super::tile_grid::{BBox, METERS_PER_DEGREE};
use crate::ogc::Srs;

/// A geometric region gating whether a query is served.
pub trait Coverage: Send + Sync + fmt::Debug {
    /// Whether `bbox` (expressed in `srs`) touches the covered area.
    fn intersects(&self, bbox: &BBox, srs: &Srs) -> bool;

    /// Bounding box of the covered area.
    fn bbox(&self) -> BBox;

    /// SRS of [`Coverage::bbox`].
    fn srs(&self) -> &Srs;
}

/// Rectangular coverage.
///
/// Queries in another SRS cannot be compared without reprojection and are
/// never rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct BBoxCoverage {
    bbox: BBox,
    srs: Srs,
}

impl BBoxCoverage {
    pub fn new(bbox: BBox, srs: Srs) -> Self {
        Self { bbox, srs }
    }
}

impl Coverage for BBoxCoverage {
    fn intersects(&self, bbox: &BBox, srs: &Srs) -> bool {
        if *srs != self.srs {
            return true;
        }
        self.bbox.intersects(bbox)
    }

    fn bbox(&self) -> BBox {
        self.bbox
    }

    fn srs(&self) -> &Srs {
        &self.srs
    }
}

/// Range of resolutions, in metres per pixel, a source is used for.
///
/// `min_res` is the coarse limit (exclusive), `max_res` the fine limit
/// (inclusive). Either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolutionRange {
    pub min_res: Option<f64>,
    pub max_res: Option<f64>,
}

impl ResolutionRange {
    pub fn new(min_res: Option<f64>, max_res: Option<f64>) -> Self {
        Self { min_res, max_res }
    }

    /// Whether a query of `bbox` at `size` pixels lies within the range.
    ///
    /// Geographic bboxes are converted to metres at the equator.
    pub fn contains(&self, bbox: &BBox, size: (u32, u32), srs: &Srs) -> bool {
        if size.0 == 0 || size.1 == 0 {
            return false;
        }
        let mut res = (bbox.width() / size.0 as f64).max(bbox.height() / size.1 as f64);
        if srs.is_geographic() {
            res *= METERS_PER_DEGREE;
        }

        if let Some(min_res) = self.min_res {
            if res >= min_res {
                return false;
            }
        }
        if let Some(max_res) = self.max_res {
            if res < max_res {
                return false;
            }
        }
        true
    }
}
