//! North-up affine transform between pixel and geographic coordinates
//!
//! ```text
//! x = west  + col * xsize
//! y = north - row * ysize
//! ```
//!
//! Row 0 is the northern edge of the raster and column 0 the western edge.

use crate::errors::{GridZoneError, Result};
use serde::{Deserialize, Serialize};

/// Affine mapping from (col, row) pixel space to (x, y) geographic space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub west: f64,
    /// Y coordinate of the upper-left corner
    pub north: f64,
    /// Pixel width, positive
    pub xsize: f64,
    /// Pixel height, positive; rows run southwards
    pub ysize: f64,
}

impl GeoTransform {
    /// Build a transform from the upper-left corner and pixel size
    ///
    /// # Errors
    ///
    /// Returns an error if either pixel size is not a positive finite number.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Result<Self> {
        for (name, value) in [("xsize", xsize), ("ysize", ysize)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridZoneError::invalid_parameter(
                    name,
                    value,
                    "pixel size must be positive and finite",
                ));
            }
        }
        if !(west.is_finite() && north.is_finite()) {
            return Err(GridZoneError::invalid_parameter(
                "origin",
                format!("({west}, {north})"),
                "origin must be finite",
            ));
        }

        Ok(Self {
            west,
            north,
            xsize,
            ysize,
        })
    }

    /// Geographic coordinates of the centre of pixel (col, row)
    #[must_use]
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.pixel_to_geo(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Geographic coordinates of the upper-left corner of pixel (col, row)
    #[must_use]
    pub fn pixel_corner(&self, col: usize, row: usize) -> (f64, f64) {
        self.pixel_to_geo(col as f64, row as f64)
    }

    /// Geographic coordinates of a fractional pixel position
    #[must_use]
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        (self.west + col * self.xsize, self.north - row * self.ysize)
    }

    /// Fractional (col, row) of a geographic position; use `.floor()` for indices
    #[must_use]
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.west) / self.xsize, (self.north - y) / self.ysize)
    }

    /// Footprint of pixel (col, row) as `(min_x, min_y, max_x, max_y)`
    #[must_use]
    pub fn pixel_bounds(&self, col: usize, row: usize) -> (f64, f64, f64, f64) {
        let (min_x, max_y) = self.pixel_corner(col, row);
        (min_x, max_y - self.ysize, min_x + self.xsize, max_y)
    }
}
