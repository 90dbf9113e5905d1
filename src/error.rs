use thiserror::Error;

/// Transport errors raised by an [`HttpClient`](crate::io::HttpClient).
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Network or connection error (DNS, TLS, timeout, reset...)
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    /// The HTTP client itself could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl IoError {
    /// HTTP status code carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            IoError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while turning a tile matrix set into a [`TileGrid`](crate::grid::TileGrid)
/// or while computing tiles from it.
#[derive(Debug, Clone, Error)]
pub enum GridError {
    /// The document is not a tile matrix set we understand
    #[error("Invalid tile matrix set: {0}")]
    InvalidDocument(String),

    /// The tile matrix set lists no tile matrices
    #[error("Tile matrix set has no tile matrices")]
    NoTileMatrices,

    /// A tile matrix has a non-positive or non-finite cell size
    #[error("Tile matrix {id} has an invalid cell size {cell_size}")]
    InvalidCellSize { id: String, cell_size: f64 },

    /// Tile matrices disagree on the tile pixel size
    #[error("Tile matrix {id} uses {found:?} pixel tiles, expected {expected:?}")]
    InconsistentTileSize {
        id: String,
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// The requested bbox or size cannot be mapped onto the grid
    #[error("Invalid map request: {0}")]
    InvalidRequest(String),

    /// The requested bbox does not touch any tile of the grid
    #[error("Requested bbox lies outside of grid {grid}")]
    OutOfBounds { grid: String },
}

/// Errors surfaced by the OGC API Tiles source.
///
/// Cloneable so a latched discovery failure can be handed to every later caller.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The configured landing page URL is unusable
    #[error("Invalid landing page URL {url}: {message}")]
    InvalidLandingPage { url: String, message: String },

    /// Network failure or non-2xx response
    #[error("Transport error: {0}")]
    Transport(#[from] IoError),

    /// Malformed or incomplete JSON, missing required keys or links
    #[error("Protocol error for {url}: {message}")]
    Protocol { url: String, message: String },

    /// No tileset could be resolved for the requested CRS and media type
    #[error("Cannot find a valid tile matrix set for {srs} ({tried} tileset(s) tried)")]
    Resolution { srs: String, tried: usize },

    /// The tiling scheme could not be turned into a grid
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// The query needs the cache subsystem and it could not answer
    #[error("Delegation error: {0}")]
    Delegation(String),
}

impl SourceError {
    pub(crate) fn protocol(url: impl Into<String>, message: impl Into<String>) -> Self {
        SourceError::Protocol {
            url: url.into(),
            message: message.into(),
        }
    }

    /// HTTP status code of the underlying transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Transport(err) => err.status(),
            _ => None,
        }
    }
}
