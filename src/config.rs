//! Configuration for the `ogcapi-tiles` command line tool.
//!
//! Options can be given on the command line or through environment variables
//! with the `OGCAPI_` prefix:
//!
//! - `OGCAPI_LANDING_PAGE` - Landing page URL of the service (required)
//! - `OGCAPI_COLLECTION` - Collection identifier
//! - `OGCAPI_TIMEOUT` - HTTP timeout in seconds (default: 30)
//! - `OGCAPI_USER_AGENT` - User agent sent with every request
//! - `OGCAPI_DISCOVERY_RETRY` - `retry` or `latch` (default: retry)
//! - `OGCAPI_COVERAGE` - Coverage bbox `minx,miny,maxx,maxy`
//! - `OGCAPI_COVERAGE_SRS` - SRS of the coverage bbox (default: EPSG:4326)
//! - `OGCAPI_MIN_RES` / `OGCAPI_MAX_RES` - Resolution range, metres per pixel

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{IoError, SourceError};
use crate::grid::{BBox, BBoxCoverage, Coverage, ResolutionRange};
use crate::io::{ReqwestHttpClient, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::ogc::{LandingPage, Srs, EPSG_4326};
use crate::source::{DiscoveryRetry, SourceOptions};

// =============================================================================
// Default Values
// =============================================================================

/// Default SRS of queries.
pub const DEFAULT_SRS: &str = "EPSG:3857";

/// Default image format of queries.
pub const DEFAULT_FORMAT: &str = "png";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Query map tiles from an OGC API Tiles service.
#[derive(Parser, Debug, Clone)]
#[command(name = "ogcapi-tiles")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceConfig,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the map tilesets of the service, grouped by CRS
    Discover,

    /// Show the grid and tile URL template serving a CRS and format
    Resolve(ResolveArgs),

    /// Fetch the map image of a bbox and write it to a file
    GetMap(GetMapArgs),
}

/// What to do after a failed discovery.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Discover again on the next request
    Retry,

    /// Keep answering with the first failure
    Latch,
}

impl From<RetryPolicy> for DiscoveryRetry {
    fn from(policy: RetryPolicy) -> Self {
        match policy {
            RetryPolicy::Retry => DiscoveryRetry::Retry,
            RetryPolicy::Latch => DiscoveryRetry::Latch,
        }
    }
}

/// Service and source options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SourceConfig {
    // =========================================================================
    // Service
    // =========================================================================
    /// Landing page URL of the OGC API service.
    #[arg(long, env = "OGCAPI_LANDING_PAGE")]
    pub landing_page: String,

    /// Collection to read tilesets from.
    ///
    /// If not specified, the tilesets of the landing page itself are used.
    #[arg(long, env = "OGCAPI_COLLECTION")]
    pub collection: Option<String>,

    // =========================================================================
    // HTTP
    // =========================================================================
    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS, env = "OGCAPI_TIMEOUT")]
    pub timeout: u64,

    /// User agent sent with every request.
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "OGCAPI_USER_AGENT")]
    pub user_agent: String,

    /// Behavior after a failed discovery.
    #[arg(long, value_enum, default_value_t = RetryPolicy::Retry, env = "OGCAPI_DISCOVERY_RETRY")]
    pub discovery_retry: RetryPolicy,

    // =========================================================================
    // Gates
    // =========================================================================
    /// Only serve queries touching this bbox (minx,miny,maxx,maxy).
    #[arg(long, env = "OGCAPI_COVERAGE")]
    pub coverage: Option<BBox>,

    /// SRS of the coverage bbox.
    #[arg(long, default_value = EPSG_4326, env = "OGCAPI_COVERAGE_SRS")]
    pub coverage_srs: String,

    /// Coarsest resolution served, in metres per pixel (exclusive).
    #[arg(long, env = "OGCAPI_MIN_RES")]
    pub min_res: Option<f64>,

    /// Finest resolution served, in metres per pixel (inclusive).
    #[arg(long, env = "OGCAPI_MAX_RES")]
    pub max_res: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// SRS of the queries, e.g. EPSG:3857.
    #[arg(long, default_value = DEFAULT_SRS)]
    pub srs: String,

    /// Image format, e.g. png.
    #[arg(long, default_value = DEFAULT_FORMAT)]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct GetMapArgs {
    /// SRS of the bbox.
    #[arg(long, default_value = DEFAULT_SRS)]
    pub srs: String,

    /// Image format, e.g. png.
    #[arg(long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// Requested area (minx,miny,maxx,maxy).
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: BBox,

    /// Image size in pixels (WIDTHxHEIGHT).
    #[arg(long, default_value = "256x256", value_parser = parse_size)]
    pub size: (u32, u32),

    /// File the image is written to.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Parse an image size given as `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (width, height) = s
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("invalid size '{}': expected WIDTHxHEIGHT", s))?;

    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size '{}': {}", s, e))
    };
    Ok((parse(width)?, parse(height)?))
}

impl SourceConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.landing_page.trim().is_empty() {
            return Err(
                "Landing page URL is required. Set --landing-page or OGCAPI_LANDING_PAGE"
                    .to_string(),
            );
        }
        self.landing().map_err(|e| e.to_string())?;

        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if let Some(coverage) = &self.coverage {
            if !coverage.is_valid() {
                return Err(format!("coverage bbox {} is empty or inverted", coverage));
            }
        }

        for (name, res) in [("min_res", self.min_res), ("max_res", self.max_res)] {
            if let Some(res) = res {
                if !res.is_finite() || res <= 0.0 {
                    return Err(format!("{} must be a positive number", name));
                }
            }
        }
        if let (Some(min_res), Some(max_res)) = (self.min_res, self.max_res) {
            if max_res >= min_res {
                return Err("max_res must be finer (smaller) than min_res".to_string());
            }
        }

        Ok(())
    }

    pub fn landing(&self) -> Result<LandingPage, SourceError> {
        LandingPage::new(&self.landing_page, self.collection.as_deref())
    }

    pub fn http_client(&self) -> Result<ReqwestHttpClient, IoError> {
        ReqwestHttpClient::with_options(Duration::from_secs(self.timeout), &self.user_agent)
    }

    /// Source options described by this configuration.
    ///
    /// No cache layer builder is configured: queries that do not match the
    /// grid fail with a delegation error.
    pub fn source_options(&self) -> SourceOptions {
        let coverage = self.coverage.map(|bbox| {
            Arc::new(BBoxCoverage::new(bbox, Srs::new(&self.coverage_srs))) as Arc<dyn Coverage>
        });
        let res_range = (self.min_res.is_some() || self.max_res.is_some())
            .then(|| ResolutionRange::new(self.min_res, self.max_res));

        SourceOptions {
            coverage,
            res_range,
            discovery_retry: self.discovery_retry.into(),
            ..SourceOptions::default()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
