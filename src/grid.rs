//! Regular north-up lat/lon grids
//!
//! Rows run from north to south and columns from west to east; coordinate
//! labels are cell centres. The grid's [`GeoTransform`] is anchored at its
//! north-west corner, which is what zone masking expects.

use crate::area::grid_cell_areas;
use crate::errors::{GridZoneError, Result};
use crate::geotransform::GeoTransform;
use crate::labeled::{CoordLabels, LabeledArray};
use crate::zones::{LAT_DIM, LON_DIM};

/// Regular grid of `nlat` x `nlon` cells
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGrid {
    transform: GeoTransform,
    nlat: usize,
    nlon: usize,
}

impl RegularGrid {
    /// Grid covering `west..east` x `south..north` with cells of `xsize` x `ysize` degrees
    ///
    /// The cell count along each axis is the extent divided by the cell size,
    /// rounded to the nearest integer; the east and south edges are snapped
    /// accordingly.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive cell sizes or extents smaller than one cell.
    pub fn from_bounds(west: f64, south: f64, east: f64, north: f64, xsize: f64, ysize: f64) -> Result<Self> {
        let transform = GeoTransform::from_origin(west, north, xsize, ysize)?;

        let nlon = ((east - west) / xsize).round();
        let nlat = ((north - south) / ysize).round();
        if !(nlon >= 1.0) {
            return Err(GridZoneError::invalid_parameter(
                "bounds",
                format!("west={west}, east={east}"),
                "extent must span at least one cell",
            ));
        }
        if !(nlat >= 1.0) {
            return Err(GridZoneError::invalid_parameter(
                "bounds",
                format!("south={south}, north={north}"),
                "extent must span at least one cell",
            ));
        }

        Ok(Self {
            transform,
            nlat: nlat as usize,
            nlon: nlon as usize,
        })
    }

    #[must_use]
    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    /// `(nlat, nlon)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.nlat, self.nlon)
    }

    /// Latitudes of the cell centres, north to south
    #[must_use]
    pub fn lat(&self) -> Vec<f64> {
        (0..self.nlat).map(|row| self.transform.pixel_center(0, row).1).collect()
    }

    /// Longitudes of the cell centres, west to east
    #[must_use]
    pub fn lon(&self) -> Vec<f64> {
        (0..self.nlon).map(|col| self.transform.pixel_center(col, 0).0).collect()
    }

    /// Area of every cell on a sphere of `radius`, labeled with the grid's axes
    ///
    /// # Errors
    ///
    /// Propagates labeling errors; none occur for a well-formed grid.
    pub fn cell_areas(&self, radius: f64) -> Result<LabeledArray<f64>> {
        let (lat, lon) = (self.lat(), self.lon());
        let areas = grid_cell_areas(&lat, &lon, self.transform.xsize, self.transform.ysize, radius);
        LabeledArray::new(
            areas.into_dyn(),
            vec![LAT_DIM.to_string(), LON_DIM.to_string()],
            vec![CoordLabels::Numeric(lat), CoordLabels::Numeric(lon)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{cell_area_with_radius, EARTH_RADIUS};
    use approx::assert_relative_eq;

    #[test]
    fn test_from_bounds_counts_cells() {
        let grid = RegularGrid::from_bounds(-10.0, 40.0, 10.0, 50.0, 0.5, 0.25).unwrap();
        assert_eq!(grid.shape(), (40, 40));
        assert_relative_eq!(grid.lat()[0], 49.875);
        assert_relative_eq!(grid.lon()[0], -9.75);
        assert_relative_eq!(*grid.lat().last().unwrap(), 40.125);
    }

    #[test]
    fn test_from_bounds_rejects_empty_extent() {
        assert!(RegularGrid::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0).is_err());
        assert!(RegularGrid::from_bounds(0.0, 1.0, 1.0, 0.0, 1.0, 1.0).is_err());
        assert!(RegularGrid::from_bounds(0.0, 0.0, 1.0, 1.0, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_cell_areas_follow_lat() {
        let grid = RegularGrid::from_bounds(0.0, 0.0, 2.0, 60.0, 1.0, 30.0).unwrap();
        let areas = grid.cell_areas(EARTH_RADIUS).unwrap();
        assert_eq!(areas.shape(), &[2, 2]);
        assert_eq!(areas.dims(), &["lat".to_string(), "lon".to_string()]);
        assert_relative_eq!(areas.data()[[0, 0]], cell_area_with_radius(45.0, 0.5, 1.0, 30.0, EARTH_RADIUS));
        assert!(areas.data()[[0, 0]] < areas.data()[[1, 0]]);
    }
}
