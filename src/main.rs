//! ogcapi-tiles - query map tiles from an OGC API Tiles service.
//!
//! This binary wires the configuration into an [`OgcApiTilesSource`] and runs
//! one command against it.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ogcapi_tiles_source::{
    config::{Cli, Command, GetMapArgs, ResolveArgs, SourceConfig},
    MapQuery, MapResponse, OgcApiTilesSource, SourceError, Srs,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = cli.source.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let source = match build_source(&cli.source) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Discover => run_discover(&source).await.map_err(|e| e.to_string()),
        Command::Resolve(args) => run_resolve(&source, &args)
            .await
            .map_err(|e| e.to_string()),
        Command::GetMap(args) => run_get_map(&source, &args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ogcapi_tiles_source=debug,ogcapi_tiles=debug"
    } else {
        "ogcapi_tiles_source=info,ogcapi_tiles=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_source(config: &SourceConfig) -> Result<OgcApiTilesSource, String> {
    let landing = config.landing().map_err(|e| e.to_string())?;
    let client = config
        .http_client()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    info!(
        "Using {} (timeout {}s)",
        landing.collection_url(),
        config.timeout
    );

    Ok(OgcApiTilesSource::new(
        landing,
        Arc::new(client),
        config.source_options(),
    ))
}

// =============================================================================
// Discover Command
// =============================================================================

async fn run_discover(source: &OgcApiTilesSource) -> Result<(), SourceError> {
    let tilesets = source.discover().await?;

    if tilesets.is_empty() {
        println!("(no map tilesets found)");
        return Ok(());
    }

    for (srs, bucket) in tilesets.iter() {
        println!("{}", srs);
        for tileset in bucket {
            println!("  {}", tileset);
        }
    }
    println!();
    println!(
        "Total: {} map tileset(s) in {} CRS(s)",
        tilesets.len(),
        tilesets.crs_count()
    );

    Ok(())
}

// =============================================================================
// Resolve Command
// =============================================================================

async fn run_resolve(source: &OgcApiTilesSource, args: &ResolveArgs) -> Result<(), SourceError> {
    let srs = Srs::new(&args.srs);
    let media_type = format!("image/{}", args.format);
    let resolved = source.resolve(&srs, &media_type).await?;

    let grid = &resolved.grid;
    println!("Grid:      {}", grid.name());
    println!("SRS:       {}", grid.srs());
    println!("Tile size: {}x{}", grid.tile_size().0, grid.tile_size().1);
    println!("Levels:    {}", grid.levels().len());
    for (z, level) in grid.levels().iter().enumerate() {
        println!(
            "  {:>2} {:<12} res={:<24} {}x{} tiles",
            z, level.id, level.resolution, level.matrix_width, level.matrix_height
        );
    }
    println!("Template:  {}", resolved.template);

    Ok(())
}

// =============================================================================
// GetMap Command
// =============================================================================

async fn run_get_map(source: &OgcApiTilesSource, args: &GetMapArgs) -> Result<(), String> {
    let query = MapQuery::new(args.bbox, args.size, Srs::new(&args.srs), &args.format);

    let response = source.get_map(&query).await.map_err(|e| match e {
        SourceError::Delegation(_) => format!(
            "{}. Only queries matching a single tile of the grid can be served without a cache",
            e
        ),
        e => e.to_string(),
    })?;

    match response {
        MapResponse::Image(image) => {
            tokio::fs::write(&args.output, &image.data)
                .await
                .map_err(|e| format!("Failed to write {}: {}", args.output.display(), e))?;
            println!(
                "Wrote {} bytes ({}) to {}",
                image.data.len(),
                image.content_type.as_deref().unwrap_or("unknown type"),
                args.output.display()
            );
        }
        MapResponse::Blank => {
            println!("Blank response: query outside of coverage, resolution range or grid");
        }
    }

    Ok(())
}
