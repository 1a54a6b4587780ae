#![warn(clippy::all)]

//! lion-basemap: plots the NYC LION street network, or any shapefile, over
//! a base map, and dumps dBase attribute tables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lion_basemap::config::RenderConfig;
use lion_basemap::file_ops::{self, ShapefilePaths};
use lion_basemap::geo::{GeoLayer, GeoLayerType, MapRenderer};
use lion_basemap::{dbf, ui};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lion-basemap", version, about = "Plot shapefiles over a base map")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file whose keys override the preset configuration
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot the NYC LION street network over its published extent
    Lion {
        /// Shapefile path, with or without `.shp`
        #[arg(default_value = "etl_dest_shp/nyc_data_exploration")]
        shapefile: PathBuf,
    },
    /// Plot any shapefile over bounds computed from its features
    Plot {
        /// Shapefile path, with or without `.shp`
        shapefile: PathBuf,
    },
    /// Print the fields and records of a dBase table
    Dbf {
        /// Table path, with or without `.dbf`
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Lion { shapefile } => {
            let config = load_config(RenderConfig::nyc_lion(), cli.config.as_deref())?;
            let paths = file_ops::resolve_shapefile(&shapefile)?;
            plot(&paths, &config)
        }
        Commands::Plot { shapefile } => {
            let config = load_config(RenderConfig::shapefile_plot(), cli.config.as_deref())?;
            let paths = file_ops::resolve_shapefile(&shapefile)?;
            plot(&paths, &config)
        }
        Commands::Dbf { path } => {
            let dbf_path = file_ops::resolve_dbf(&path)?;
            let stdout = std::io::stdout();
            let count = dbf::dump(&dbf_path, &mut stdout.lock())
                .with_context(|| format!("dumping {}", dbf_path.display()))?;
            log::info!("{} records in {}", count, dbf_path.display());
            Ok(())
        }
    }
}

fn load_config(preset: RenderConfig, overrides: Option<&Path>) -> anyhow::Result<RenderConfig> {
    match overrides {
        Some(path) => Ok(preset
            .with_overrides_from(path)
            .with_context(|| format!("reading configuration {}", path.display()))?),
        None => Ok(preset),
    }
}

fn plot(paths: &ShapefilePaths, config: &RenderConfig) -> anyhow::Result<()> {
    // The attribute table is only read when labels are drawn
    let dbf = config.show_labels.then_some(paths.dbf.as_deref()).flatten();
    let mut overlay = GeoLayer::new(GeoLayerType::Overlay);
    overlay
        .load_from_shapefile_path(&paths.shp, dbf)
        .with_context(|| format!("loading {}", paths.shp.display()))?;
    if overlay.is_empty() {
        log::warn!("{} has no drawable features", paths.shp.display());
    }

    let envelope = match config.corners() {
        Some(corners) => {
            log::info!("Using configured corners {:?}", corners);
            corners
        }
        None => overlay
            .envelope(config.margin_fraction)
            .with_context(|| format!("computing bounds of {}", paths.shp.display()))?,
    };

    let title = config
        .title
        .clone()
        .unwrap_or_else(|| format!("Plotting the Shapefile {}", paths.shp.display()));

    let renderer = MapRenderer::new(envelope, overlay, config)?;
    ui::show_map(renderer, &title)?;
    Ok(())
}
