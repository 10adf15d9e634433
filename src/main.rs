//! Entry point for the gridzone application.
//! Handles CLI parsing and logging setup, and dispatches the cell-area and zone-area commands.

use clap::Parser;
use gridzone::grid::RegularGrid;
use gridzone::mask::MaskOptions;
use gridzone::parallel::{get_parallel_info, ParallelConfig};
use gridzone::statistics::zone_area_summary;
use gridzone::zones::read_zone_file;
use gridzone::{cell_area_with_radius, ZoneMasker};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Args, Command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    ParallelConfig::new(args.threads).setup_global_pool()?;
    get_parallel_info().log();

    match args.command {
        Command::CellArea {
            lat,
            lon,
            xsize,
            ysize,
            radius,
        } => {
            println!("{}", cell_area_with_radius(lat, lon, xsize, ysize, radius));
        }
        Command::ZoneAreas {
            zones,
            name_property,
            bounds,
            xsize,
            ysize,
            crs,
            radius,
            chunk,
            all_touched,
            json,
        } => {
            let (names, shapes) = read_zone_file(&zones, &name_property)?;
            tracing::info!(zones = names.len(), path = %zones.display(), "Loaded zones");

            let grid = RegularGrid::from_bounds(bounds.west, bounds.south, bounds.east, bounds.north, xsize, ysize)?;
            let options = MaskOptions {
                all_touched,
                invert: false,
            };
            let masker = ZoneMasker::new(names.as_slice(), &shapes, &crs, grid.transform(), options)?;
            tracing::debug!(crs = %masker.crs(), shape = ?grid.shape(), "Built zone masker");
            let summary = zone_area_summary(&masker, &grid, radius, chunk)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{:<24} {:>10} {:>20}", "zone", "cells", "area");
                for zone in &summary {
                    println!("{:<24} {:>10} {:>20.3}", zone.zone, zone.cells, zone.area);
                }
            }
        }
    }

    Ok(())
}
