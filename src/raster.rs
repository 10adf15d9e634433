//! Transient in-memory raster container
//!
//! A [`MemRaster`] holds a `(bands, rows, cols)` buffer together with the
//! georeferencing needed to mask it: transform, CRS, pixel window and the
//! no-data sentinel. It lives for the duration of one block's masking and is
//! released when it goes out of scope.

use crate::crs::Crs;
use crate::errors::{GridZoneError, Result};
use crate::geotransform::GeoTransform;
use crate::mask::{geometry_mask, MaskOptions, Window, ZoneShape};
use ndarray::{Array3, ArrayView3, Axis, Zip};
use num_traits::{Float, NumCast};
use std::fmt::Debug;

/// No-data sentinel written into cells outside a mask
pub const NODATA: f64 = -9999.0;

/// Numeric element types that can be stored in a [`MemRaster`]
pub trait RasterElement: Float + Send + Sync + Debug + 'static {}

impl<T> RasterElement for T where T: Float + Send + Sync + Debug + 'static {}

/// Creation parameters of a [`MemRaster`]
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProfile {
    pub width: usize,
    pub height: usize,
    pub count: usize,
    pub crs: Crs,
    pub transform: GeoTransform,
    pub window: Window,
    pub nodata: f64,
}

/// In-memory raster with `count` bands of `height` x `width` pixels
#[derive(Debug)]
pub struct MemRaster<T> {
    profile: RasterProfile,
    nodata: T,
    data: Array3<T>,
}

impl<T: RasterElement> MemRaster<T> {
    /// Allocate a raster filled with the no-data value
    ///
    /// # Errors
    ///
    /// Returns an error if the no-data value is not representable in `T`.
    pub fn create(profile: RasterProfile) -> Result<Self> {
        let nodata = <T as NumCast>::from(profile.nodata).ok_or_else(|| {
            GridZoneError::invalid_parameter("nodata", profile.nodata, "not representable in raster type")
        })?;
        let data = Array3::from_elem((profile.count, profile.height, profile.width), nodata);

        Ok(Self {
            profile,
            nodata,
            data,
        })
    }

    #[must_use]
    pub fn nodata(&self) -> T {
        self.nodata
    }

    /// Overwrite every band
    ///
    /// # Errors
    ///
    /// Returns [`GridZoneError::ShapeMismatch`] if `bands` is not `(count, height, width)`.
    pub fn write(&mut self, bands: ArrayView3<'_, T>) -> Result<()> {
        if bands.shape() != self.data.shape() {
            return Err(GridZoneError::ShapeMismatch {
                expected: self.data.shape().to_vec(),
                actual: bands.shape().to_vec(),
            });
        }
        self.data.assign(&bands);
        Ok(())
    }

    #[must_use]
    pub fn read(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    /// Copy of the raster with every pixel outside `shapes` set to the no-data value
    ///
    /// # Errors
    ///
    /// Returns [`GridZoneError::InvalidGeometry`] if `shapes` is empty.
    pub fn mask(&self, shapes: &[ZoneShape], options: MaskOptions) -> Result<Array3<T>> {
        if shapes.is_empty() {
            return Err(GridZoneError::InvalidGeometry("no shapes to mask with".to_string()));
        }

        let keep = geometry_mask(
            shapes,
            &self.profile.transform,
            self.profile.window,
            self.profile.height,
            self.profile.width,
            options,
        );

        if !keep.iter().any(|&k| k) {
            tracing::debug!(
                window = ?self.profile.window,
                "Shapes do not overlap raster window, every pixel masked"
            );
        }

        let nodata = self.nodata;
        let mut masked = self.data.clone();
        for band in masked.axis_iter_mut(Axis(0)) {
            Zip::from(band).and(&keep).for_each(|value, &k| {
                if !k {
                    *value = nodata;
                }
            });
        }
        Ok(masked)
    }
}
