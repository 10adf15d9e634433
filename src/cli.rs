//! Defines command-line interface options using `clap` for the gridzone application.

use clap::{Parser, Subcommand};
use gridzone::EARTH_RADIUS;
use std::path::PathBuf;

/// Grid cell areas and per-zone area summaries for lat/lon grids
#[derive(Parser, Debug)]
#[command(name = "gridzone", version, about = "Grid cell areas and zone masking for lat/lon grids")]
pub struct Args {
    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Surface area of a single grid cell
    CellArea {
        /// Latitude of the cell centre in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the cell centre in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Cell width in degrees longitude
        #[arg(long)]
        xsize: f64,
        /// Cell height in degrees latitude
        #[arg(long)]
        ysize: f64,
        /// Sphere radius; the area is in units of radius squared
        #[arg(long, default_value_t = EARTH_RADIUS)]
        radius: f64,
    },

    /// Cell count and total area of every zone in a GeoJSON file over a regular grid
    ZoneAreas {
        /// GeoJSON FeatureCollection holding the zone polygons
        #[arg(short, long)]
        zones: PathBuf,
        /// Feature property holding the zone name
        #[arg(long, default_value = "name")]
        name_property: String,
        /// Grid extent formatted as <west>,<south>,<east>,<north>
        #[arg(long, value_parser = parse_bounds, allow_hyphen_values = true)]
        bounds: Bounds,
        /// Cell width in degrees longitude
        #[arg(long)]
        xsize: f64,
        /// Cell height in degrees latitude
        #[arg(long)]
        ysize: f64,
        /// CRS of the zone polygons, PROJ4 or EPSG:<code>
        #[arg(long, default_value = "+proj=longlat +datum=WGS84 +no_defs")]
        crs: String,
        /// Sphere radius; areas are in units of radius squared
        #[arg(long, default_value_t = EARTH_RADIUS)]
        radius: f64,
        /// Process the grid in square blocks of this many cells
        #[arg(long)]
        chunk: Option<usize>,
        /// Count every cell touched by a zone, not only those whose centre is inside
        #[arg(long, default_value_t = false)]
        all_touched: bool,
        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

fn parse_bounds(s: &str) -> Result<Bounds, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let values = parts
        .iter()
        .map(|p| p.parse::<f64>().map_err(|_| format!("Invalid number '{p}' in bounds")))
        .collect::<Result<Vec<f64>, String>>()?;

    match values.as_slice() {
        [west, south, east, north] => Ok(Bounds {
            west: *west,
            south: *south,
            east: *east,
            north: *north,
        }),
        _ => Err("Invalid format: Expected '<west>,<south>,<east>,<north>'.".to_string()),
    }
}
