//! Coordinate reference system identifiers.
//!
//! Only the small amount of CRS handling the tiles source needs lives here:
//! turning the URIs found in OGC API documents into `AUTHORITY:CODE` strings and
//! treating `OGC:CRS84` and `EPSG:4326` as the same system. Anything involving
//! actual coordinate transformation is out of scope.

use std::fmt;

/// OGC identifier of WGS84 with longitude/latitude axis order.
pub const OGC_CRS84: &str = "OGC:CRS84";

/// EPSG identifier of WGS84.
pub const EPSG_4326: &str = "EPSG:4326";

/// Geographic CRSs whose authority axis order is latitude first.
const LAT_LON_CODES: &[&str] = &["EPSG:4326", "EPSG:4258", "EPSG:4269", "EPSG:4171"];

/// Geographic CRSs (degrees as unit), in either axis order.
const GEOGRAPHIC_CODES: &[&str] = &[
    "OGC:CRS84",
    "EPSG:4326",
    "EPSG:4258",
    "EPSG:4269",
    "EPSG:4171",
];

/// Collapse `OGC:CRS84` into `EPSG:4326`; every other code passes through.
pub fn normalize_srs_code(code: &str) -> &str {
    if code == OGC_CRS84 {
        EPSG_4326
    } else {
        code
    }
}

/// Convert an OGC CRS reference into an `AUTHORITY:CODE` string.
///
/// Accepts `http(s)://www.opengis.net/def/crs/{authority}/{version}/{code}` URIs,
/// `urn:ogc:def:crs:{authority}:{version}:{code}` URNs and `[AUTHORITY:CODE]` safe
/// CURIEs. Anything else is assumed to already be an authority code.
pub fn ogc_crs_url_to_auth_code(crs: &str) -> String {
    let crs = crs.trim();

    for prefix in [
        "http://www.opengis.net/def/crs/",
        "https://www.opengis.net/def/crs/",
    ] {
        if let Some(rest) = crs.strip_prefix(prefix) {
            let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
            if let [authority, _version, code] = parts.as_slice() {
                return format!("{}:{}", authority, code);
            }
        }
    }

    if let Some(rest) = crs.strip_prefix("urn:ogc:def:crs:") {
        let parts: Vec<&str> = rest.split(':').collect();
        if parts.len() >= 2 {
            if let (Some(authority), Some(code)) = (parts.first(), parts.last()) {
                return format!("{}:{}", authority, code);
            }
        }
    }

    if let Some(curie) = crs.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return curie.to_string();
    }

    crs.to_string()
}

/// Returns true if the authority defines this CRS with latitude as first axis.
pub fn is_lat_lon_order(auth_code: &str) -> bool {
    LAT_LON_CODES.contains(&auth_code)
}

/// A spatial reference system, identified by its normalized authority code.
///
/// Two `Srs` values compare equal when their normalized codes match, so
/// `Srs::new("OGC:CRS84") == Srs::new("EPSG:4326")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Srs {
    code: String,
}

impl Srs {
    /// Create an SRS from an authority code (`EPSG:3857`, `OGC:CRS84`...).
    pub fn new(code: impl AsRef<str>) -> Self {
        Self {
            code: normalize_srs_code(code.as_ref().trim()).to_string(),
        }
    }

    /// Create an SRS from any CRS reference found in OGC API documents.
    pub fn from_ogc_crs(crs: &str) -> Self {
        Self::new(ogc_crs_url_to_auth_code(crs))
    }

    /// Normalized authority code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether coordinates are expressed in degrees.
    pub fn is_geographic(&self) -> bool {
        GEOGRAPHIC_CODES.contains(&self.code.as_str())
    }
}

impl fmt::Display for Srs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
