//! Surface area of lat/lon grid cells on a reference sphere
//!
//! A cell centred at (`lat`, `lon`) with angular extents (`xsize`, `ysize`)
//! covers the spherical rectangle bounded by `lon ± xsize/2` and
//! `lat ± ysize/2`. Its area is
//!
//! ```text
//! R² · |sin(lat2) − sin(lat1)| · |lon2 − lon1|
//! ```
//!
//! with all angles in radians. No range checks are done on the inputs, so the
//! functions stay usable element-wise over whole arrays; latitudes beyond ±90°
//! give finite but geographically meaningless values.

use crate::errors::{GridZoneError, Result};
use ndarray::{Array2, ArrayD, ArrayViewD, Zip};

/// Reference spherical Earth radius in metres
pub const EARTH_RADIUS: f64 = 6_367_470.0;

/// Area of one grid cell on the reference sphere, in square metres
#[must_use]
pub fn cell_area(lat: f64, lon: f64, xsize: f64, ysize: f64) -> f64 {
    cell_area_with_radius(lat, lon, xsize, ysize, EARTH_RADIUS)
}

/// Area of one grid cell on a sphere of the given radius, in units of `radius²`
#[must_use]
pub fn cell_area_with_radius(lat: f64, lon: f64, xsize: f64, ysize: f64, radius: f64) -> f64 {
    let lon1 = (lon - xsize / 2.0).to_radians();
    let lon2 = (lon + xsize / 2.0).to_radians();

    let lat1 = (lat - ysize / 2.0).to_radians();
    let lat2 = (lat + ysize / 2.0).to_radians();

    radius.powi(2) * (lat2.sin() - lat1.sin()).abs() * (lon2 - lon1).abs()
}

/// Element-wise [`cell_area_with_radius`] over same-shaped arrays
///
/// # Errors
///
/// Returns [`GridZoneError::ShapeMismatch`] if any input differs in shape from `lat`.
pub fn cell_areas(
    lat: ArrayViewD<'_, f64>,
    lon: ArrayViewD<'_, f64>,
    xsize: ArrayViewD<'_, f64>,
    ysize: ArrayViewD<'_, f64>,
    radius: f64,
) -> Result<ArrayD<f64>> {
    for other in [lon.shape(), xsize.shape(), ysize.shape()] {
        if other != lat.shape() {
            return Err(GridZoneError::ShapeMismatch {
                expected: lat.shape().to_vec(),
                actual: other.to_vec(),
            });
        }
    }

    Ok(Zip::from(&lat)
        .and(&lon)
        .and(&xsize)
        .and(&ysize)
        .par_map_collect(|&la, &lo, &xs, &ys| cell_area_with_radius(la, lo, xs, ys, radius)))
}

/// Cell areas for every (lat, lon) pair of two coordinate axes
///
/// The result has shape `(lat.len(), lon.len())`.
#[must_use]
pub fn grid_cell_areas(lat: &[f64], lon: &[f64], xsize: f64, ysize: f64, radius: f64) -> Array2<f64> {
    Array2::from_shape_fn((lat.len(), lon.len()), |(i, j)| {
        cell_area_with_radius(lat[i], lon[j], xsize, ysize, radius)
    })
}
