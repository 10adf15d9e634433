//! Zone-masked expansion of lat/lon arrays
//!
//! [`add_zone_dim`] takes an array with `lat` and `lon` axes and a list of
//! named zone polygons, and returns a new array with a leading zone axis.
//! Slice `z` of the result is the input with every cell outside zone `z` set
//! to NaN.
//!
//! The work is done per block: every block of a chunked input (or the whole
//! array when unchunked) is copied into a [`MemRaster`], masked once per zone,
//! and its per-zone results are stacked and written back into the output at
//! the block's offset. Blocks are independent and run on the rayon pool.

use crate::chunks::{Block, ChunkLayout};
use crate::crs::Crs;
use crate::errors::{GridZoneError, Result};
use crate::geotransform::GeoTransform;
use crate::labeled::{CoordLabels, LabeledArray};
use crate::mask::{MaskOptions, Window, ZoneShape};
use crate::raster::{MemRaster, RasterElement, RasterProfile, NODATA};
use ndarray::{Array3, ArrayD, ArrayViewD, Axis, IxDyn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default name of the zone axis
pub const DEFAULT_ZONE_DIM: &str = "zone";

/// Name of the latitude axis
pub const LAT_DIM: &str = "lat";

/// Name of the longitude axis
pub const LON_DIM: &str = "lon";

/// Immutable masking context shared by every block of one call
#[derive(Debug, Clone)]
pub struct ZoneMasker {
    zones: Vec<String>,
    shapes: Vec<ZoneShape>,
    crs: Crs,
    transform: GeoTransform,
    options: MaskOptions,
}

impl ZoneMasker {
    /// Validate zone names and shapes and bind them to a transform and CRS
    ///
    /// # Errors
    ///
    /// Returns an error if names and shapes are not paired one to one, a name
    /// repeats, a shape is not polygonal, or the CRS is malformed.
    pub fn new<S: AsRef<str>>(
        zones: &[S],
        shapes: &[geojson::Geometry],
        crs: &str,
        transform: GeoTransform,
        options: MaskOptions,
    ) -> Result<Self> {
        if zones.len() != shapes.len() {
            return Err(GridZoneError::ZoneCountMismatch {
                zones: zones.len(),
                shapes: shapes.len(),
            });
        }

        let mut seen = HashSet::new();
        for zone in zones {
            if !seen.insert(zone.as_ref()) {
                return Err(GridZoneError::DuplicateZone(zone.as_ref().to_string()));
            }
        }

        let shapes = shapes
            .iter()
            .map(ZoneShape::from_geojson)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            zones: zones.iter().map(|z| z.as_ref().to_string()).collect(),
            shapes,
            crs: Crs::parse(crs)?,
            transform,
            options,
        })
    }

    #[must_use]
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    #[must_use]
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    #[must_use]
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Expand `data` with a leading axis `dim` holding one masked copy per zone
    ///
    /// # Errors
    ///
    /// Returns an error if `dim` already exists, the `lat` or `lon` axis is
    /// missing, or masking a block fails. A failing block aborts the call.
    pub fn apply<T: RasterElement>(&self, data: &LabeledArray<T>, dim: &str) -> Result<LabeledArray<T>> {
        if data.dims().iter().any(|d| d == dim) {
            return Err(GridZoneError::DimensionExists { dim: dim.to_string() });
        }
        let lat_axis = data.axis_of(LAT_DIM)?;
        let lon_axis = data.axis_of(LON_DIM)?;

        let layout = data
            .chunks()
            .cloned()
            .unwrap_or_else(|| ChunkLayout::single(data.shape()));
        let blocks = layout.blocks();

        tracing::info!(
            zones = self.zones.len(),
            blocks = blocks.len(),
            shape = ?data.shape(),
            "Masking array by zone"
        );

        let mut out_shape = Vec::with_capacity(data.ndim() + 1);
        out_shape.push(self.zones.len());
        out_shape.extend_from_slice(data.shape());
        let mut out = ArrayD::from_elem(IxDyn(&out_shape), T::nan());

        if !self.zones.is_empty() {
            let results = blocks
                .into_par_iter()
                .map(|block| {
                    let view = data.data().slice_each_axis(|ax| block.slice(ax.axis.index()));
                    self.mask_block(view, &block, lat_axis, lon_axis)
                        .map(|stacked| (block, stacked))
                })
                .collect::<Result<Vec<_>>>()?;

            for (block, stacked) in results {
                out.slice_each_axis_mut(|ax| match ax.axis.index() {
                    0 => ndarray::Slice::from(..),
                    i => block.slice(i - 1),
                })
                .assign(&stacked);
            }
        }

        let mut dims = Vec::with_capacity(out_shape.len());
        dims.push(dim.to_string());
        dims.extend(data.dims().iter().cloned());
        let mut coords = Vec::with_capacity(out_shape.len());
        coords.push(CoordLabels::names(&self.zones));
        coords.extend(data.coords().iter().cloned());

        let expanded = LabeledArray::new(out, dims, coords)?;
        match data.chunks() {
            Some(layout) => expanded.with_chunks(layout.prepend_axis(self.zones.len())),
            None => Ok(expanded),
        }
    }

    /// Mask one block by every zone; the result has shape `[zones] ++ block.shape`
    fn mask_block<T: RasterElement>(
        &self,
        block: ArrayViewD<'_, T>,
        region: &Block,
        lat_axis: usize,
        lon_axis: usize,
    ) -> Result<ArrayD<T>> {
        tracing::debug!(index = ?region.index, offsets = ?region.offsets, shape = ?region.shape, "Masking block");

        // bands first, then rows (lat) and columns (lon)
        let mut order: Vec<usize> = (0..block.ndim()).filter(|&a| a != lat_axis && a != lon_axis).collect();
        let band_shape: Vec<usize> = order.iter().map(|&a| block.len_of(Axis(a))).collect();
        order.push(lat_axis);
        order.push(lon_axis);

        let rows = block.len_of(Axis(lat_axis));
        let cols = block.len_of(Axis(lon_axis));
        let bands: usize = band_shape.iter().product();

        let permuted = block.permuted_axes(IxDyn(&order));
        let buffer = Array3::from_shape_vec((bands, rows, cols), permuted.iter().cloned().collect())?;

        let mut raster = MemRaster::create(RasterProfile {
            width: cols,
            height: rows,
            count: bands,
            crs: self.crs.clone(),
            transform: self.transform,
            window: Window {
                col_off: region.offsets[lon_axis],
                row_off: region.offsets[lat_axis],
            },
            nodata: NODATA,
        })?;
        raster.write(buffer.view())?;

        let mut inverse = vec![0; order.len()];
        for (position, &axis) in order.iter().enumerate() {
            inverse[axis] = position;
        }
        let mut permuted_shape = band_shape;
        permuted_shape.push(rows);
        permuted_shape.push(cols);

        let nodata = raster.nodata();
        let mut per_zone = Vec::with_capacity(self.shapes.len());
        for shape in &self.shapes {
            let mut masked = raster.mask(std::slice::from_ref(shape), self.options)?;
            masked.mapv_inplace(|v| if v == nodata { T::nan() } else { v });
            let restored = masked
                .into_shape(IxDyn(&permuted_shape))?
                .permuted_axes(IxDyn(&inverse));
            per_zone.push(restored);
        }

        let views: Vec<ArrayViewD<'_, T>> = per_zone.iter().map(|a| a.view()).collect();
        Ok(ndarray::stack(Axis(0), &views)?)
    }
}

/// Expand `data` with a leading zone axis, one masked copy per zone
///
/// The transform is anchored at `lon[0]` (west) and `lat[last]` (north) of
/// `data`, with pixel size `xsize` x `ysize`. Row 0 of the lat axis is taken
/// as the northern row, so callers must label the axes such that those two
/// values are the north-west corner of the grid; otherwise the masks are
/// silently misaligned. Use [`add_zone_dim_with_transform`] to pass the
/// transform explicitly.
///
/// # Errors
///
/// Returns an error if the zones and shapes do not pair up, the `lat`/`lon`
/// axes are missing or not numeric, the CRS is malformed, or a shape is not
/// polygonal.
pub fn add_zone_dim<T: RasterElement, S: AsRef<str>>(
    data: &LabeledArray<T>,
    zones: &[S],
    shapes: &[geojson::Geometry],
    crs: &str,
    xsize: f64,
    ysize: f64,
    dim: &str,
) -> Result<LabeledArray<T>> {
    let lat = data.numeric_coord(LAT_DIM)?;
    let lon = data.numeric_coord(LON_DIM)?;
    let (Some(&west), Some(&north)) = (lon.first(), lat.last()) else {
        return Err(GridZoneError::InvalidCoordinate {
            dim: (if lon.is_empty() { LON_DIM } else { LAT_DIM }).to_string(),
            message: "axis has no labels".to_string(),
        });
    };

    let transform = GeoTransform::from_origin(west, north, xsize, ysize)?;
    add_zone_dim_with_transform(data, zones, shapes, crs, transform, dim, MaskOptions::default())
}

/// [`add_zone_dim`] with an explicit transform and masking options
///
/// # Errors
///
/// See [`add_zone_dim`].
pub fn add_zone_dim_with_transform<T: RasterElement, S: AsRef<str>>(
    data: &LabeledArray<T>,
    zones: &[S],
    shapes: &[geojson::Geometry],
    crs: &str,
    transform: GeoTransform,
    dim: &str,
    options: MaskOptions,
) -> Result<LabeledArray<T>> {
    ZoneMasker::new(zones, shapes, crs, transform, options)?.apply(data, dim)
}

/// Zone names and geometries from a GeoJSON FeatureCollection
///
/// Each feature's name is read from `name_property`; string and numeric
/// values are accepted. Features without geometry are skipped.
///
/// # Errors
///
/// Returns an error if a feature with geometry lacks the name property.
pub fn zones_from_features(
    collection: geojson::FeatureCollection,
    name_property: &str,
) -> Result<(Vec<String>, Vec<geojson::Geometry>)> {
    let mut names = Vec::new();
    let mut shapes = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            tracing::warn!(index, "Skipping feature without geometry");
            continue;
        };
        let name = match feature.properties.as_ref().and_then(|p| p.get(name_property)) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(GridZoneError::InvalidGeometry(format!(
                    "feature {index} has no '{name_property}' property"
                )))
            }
        };
        names.push(name);
        shapes.push(geometry);
    }

    Ok((names, shapes))
}

/// Read zones from a GeoJSON FeatureCollection file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or see [`zones_from_features`].
pub fn read_zone_file(path: &Path, name_property: &str) -> Result<(Vec<String>, Vec<geojson::Geometry>)> {
    let reader = BufReader::new(File::open(path)?);
    let collection: geojson::FeatureCollection = serde_json::from_reader(reader)?;
    zones_from_features(collection, name_property)
}
