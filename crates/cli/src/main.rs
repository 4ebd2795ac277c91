//! # mapgen - multi-scale map file generator
//!
//! ```text
//! mapgen import <in.geojson> <features.raw>   GeoJSON to raw features
//! mapgen build  <features.raw> <out.mwm>      raw features to a map file
//! mapgen inspect <out.mwm>                    dump directory and header
//! ```
//!
//! ## Configuration
//!
//! `build` reads optional files, each also settable from the environment:
//!
//! ```text
//! MAPGEN_CONFIG        build config TOML (coord bits, classificator)
//! MAPGEN_REGION        region info TOML  (flat string table)
//! MAPGEN_BORDERS       border rect TOML  (min_x, min_y, max_x, max_y)
//! MAPGEN_VERSION_DATE  build date YYMMDD (default: today, UTC)
//! ```
//!
//! Logging goes to stderr and is filtered with `RUST_LOG` (default `info`).

mod import;
mod inspect;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{load_borders, BuildConfig, MapType, RegionData};
use generator::{generate_final_features, BuildInfo};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mapgen", version, about = "Builds multi-scale vector map files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a GeoJSON feature collection into a raw feature file.
    Import { input: PathBuf, output: PathBuf },
    /// Build a map file from a raw feature file.
    Build(BuildArgs),
    /// Print the section directory and header of a map file.
    Inspect { map: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MapKind {
    World,
    WorldCoasts,
    Country,
}

impl From<MapKind> for MapType {
    fn from(kind: MapKind) -> Self {
        match kind {
            MapKind::World => MapType::World,
            MapKind::WorldCoasts => MapType::WorldCoasts,
            MapKind::Country => MapType::Country,
        }
    }
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Raw feature file written by `mapgen import`.
    raw: PathBuf,
    /// Map file to create. Replaced atomically on success.
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = MapKind::Country)]
    map_type: MapKind,

    #[arg(long, env = "MAPGEN_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "MAPGEN_REGION")]
    region: Option<PathBuf>,

    #[arg(long, env = "MAPGEN_BORDERS")]
    borders: Option<PathBuf>,

    /// Build date as YYMMDD.
    #[arg(long, env = "MAPGEN_VERSION_DATE")]
    version_date: Option<u32>,
}

fn today() -> u32 {
    let now = chrono::Utc::now();
    now.format("%y%m%d").to_string().parse().unwrap_or(0)
}

fn build(args: BuildArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => BuildConfig::load(path)?,
        None => {
            warn!("no build config given, using defaults with an empty classificator");
            BuildConfig::default()
        }
    };
    let region = match &args.region {
        Some(path) => RegionData::load(path)?,
        None => {
            warn!("no region info given, rgninfo section will be empty");
            RegionData::default()
        }
    };
    let borders = args.borders.as_ref().map(load_borders).transpose()?;

    let info = BuildInfo {
        map_type: args.map_type.into(),
        config: &config,
        region: &region,
        version_date: args.version_date.unwrap_or_else(today),
    };
    info!(raw = %args.raw.display(), output = %args.output.display(), map_type = ?info.map_type, "build started");
    let summary = generate_final_features(&args.raw, &args.output, &info, &borders)
        .with_context(|| format!("building {}", args.output.display()))?;

    println!(
        "wrote {} features ({} dropped) to {}",
        summary.features_written,
        summary.features_dropped,
        args.output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Import { input, output } => {
            let stats = import::import_geojson(&input, &output)?;
            println!(
                "imported {} features ({} skipped) into {}",
                stats.written,
                stats.skipped,
                output.display()
            );
        }
        Command::Build(args) => build(args)?,
        Command::Inspect { map } => inspect::inspect(&map, &mut io::stdout().lock())?,
    }
    Ok(())
}
