//! gridzone: grid cell areas and zone masking for lat/lon rasters
//!
//! Two independent operations on regular latitude/longitude grids:
//!
//! - **Cell area**: the surface area of a grid cell on a reference sphere,
//!   from its centre and angular size ([`area::cell_area`]).
//! - **Zone masking**: expansion of a labeled array with a leading zone axis,
//!   where each zone slice keeps only the cells inside that zone's polygon
//!   ([`zones::add_zone_dim`]).
//!
//! ## Module Organization
//!
//! - [`area`]: cell areas, scalar and array-wise
//! - [`labeled`]: labeled N-dimensional arrays with optional chunking
//! - [`chunks`]: block partitioning of chunked arrays
//! - [`geotransform`]: north-up affine pixel transform
//! - [`crs`]: CRS descriptor parsing
//! - [`mask`]: polygon rasterization
//! - [`raster`]: in-memory raster container used during masking
//! - [`zones`]: zone masking over blocks
//! - [`statistics`]: NaN-skipping reductions over the spatial axes
//! - [`grid`]: regular lat/lon grids
//! - [`parallel`]: rayon pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gridzone::prelude::*;
//! use ndarray::{Array, IxDyn};
//!
//! let data = Array::from_elem(IxDyn(&[3, 4, 4]), 1.0_f64);
//! let array = LabeledArray::new(
//!     data,
//!     vec!["time".into(), "lat".into(), "lon".into()],
//!     vec![
//!         CoordLabels::Numeric(vec![0.0, 1.0, 2.0]),
//!         CoordLabels::Numeric(vec![0.5, 1.5, 2.5, 3.5]),
//!         CoordLabels::Numeric(vec![0.0, 1.0, 2.0, 3.0]),
//!     ],
//! )?
//! .chunk(&[("time", 1)])?;
//!
//! let shape = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
//!     vec![0.0, 0.0], vec![2.0, 0.0], vec![2.0, 4.0], vec![0.0, 4.0], vec![0.0, 0.0],
//! ]]));
//! let zoned = add_zone_dim(&array, &["west"], &[shape], "+proj=longlat +datum=WGS84", 1.0, 1.0, "zone")?;
//! assert_eq!(zoned.shape(), &[1, 3, 4, 4]);
//!
//! let area = cell_area(45.0, 10.0, 0.25, 0.25);
//! # Ok::<(), gridzone::GridZoneError>(())
//! ```

pub mod area;
pub mod chunks;
pub mod crs;
pub mod errors;
pub mod geotransform;
pub mod grid;
pub mod labeled;
pub mod mask;
pub mod parallel;
pub mod raster;
pub mod statistics;
pub mod zones;

pub use area::{cell_area, cell_area_with_radius, cell_areas, grid_cell_areas, EARTH_RADIUS};
pub use errors::{GridZoneError, Result};
pub use labeled::{CoordLabels, LabeledArray};
pub use raster::NODATA;
pub use zones::{add_zone_dim, add_zone_dim_with_transform, ZoneMasker, DEFAULT_ZONE_DIM};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::area::{cell_area, cell_area_with_radius, EARTH_RADIUS};
    pub use crate::chunks::ChunkLayout;
    pub use crate::errors::{GridZoneError, Result};
    pub use crate::geotransform::GeoTransform;
    pub use crate::grid::RegularGrid;
    pub use crate::labeled::{CoordLabels, LabeledArray};
    pub use crate::mask::MaskOptions;
    pub use crate::parallel::ParallelConfig;
    pub use crate::raster::NODATA;
    pub use crate::statistics::{reduce_spatial, ZonalOperation, ZoneArea};
    pub use crate::zones::{add_zone_dim, add_zone_dim_with_transform, ZoneMasker, DEFAULT_ZONE_DIM};
}
