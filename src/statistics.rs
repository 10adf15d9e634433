//! Zonal reductions over the spatial axes
//!
//! These functions reduce the `lat` and `lon` axes of a (usually
//! zone-expanded) array, skipping NaN and infinite cells so that the missing
//! markers written by zone masking do not contribute.

use crate::errors::Result;
use crate::grid::RegularGrid;
use crate::labeled::LabeledArray;
use crate::raster::RasterElement;
use crate::zones::{ZoneMasker, DEFAULT_ZONE_DIM, LAT_DIM, LON_DIM};
use ndarray::{ArrayD, Axis, IxDyn};
use num_traits::NumCast;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Supported zonal reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonalOperation {
    /// Sum of finite cells, 0 when there are none
    Sum,
    /// Mean of finite cells
    Mean,
    /// Minimum finite cell
    Min,
    /// Maximum finite cell
    Max,
    /// Number of finite cells
    Count,
}

impl ZonalOperation {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "minimum",
            Self::Max => "maximum",
            Self::Count => "count",
        }
    }

    fn reduce<T: RasterElement>(self, values: &[T]) -> T {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        match self {
            Self::Sum => finite.fold(T::zero(), |acc, v| acc + v),
            Self::Count => <T as NumCast>::from(finite.count()).unwrap_or_else(T::nan),
            Self::Mean => {
                let (sum, count) = finite.fold((T::zero(), 0usize), |(s, n), v| (s + v, n + 1));
                match <T as NumCast>::from(count) {
                    Some(n) if count > 0 => sum / n,
                    _ => T::nan(),
                }
            }
            Self::Min => finite.fold(None, |acc: Option<T>, v| Some(acc.map_or(v, |a| a.min(v)))).unwrap_or_else(T::nan),
            Self::Max => finite.fold(None, |acc: Option<T>, v| Some(acc.map_or(v, |a| a.max(v)))).unwrap_or_else(T::nan),
        }
    }
}

/// Reduce the `lat` and `lon` axes of `data`
///
/// The result keeps every other axis, with its labels, in the original order.
/// Chunking is not carried over.
///
/// # Errors
///
/// Returns an error if `data` has no `lat` or `lon` axis.
pub fn reduce_spatial<T: RasterElement>(data: &LabeledArray<T>, operation: ZonalOperation) -> Result<LabeledArray<T>> {
    let lat_axis = data.axis_of(LAT_DIM)?;
    let lon_axis = data.axis_of(LON_DIM)?;

    let mut order: Vec<usize> = (0..data.ndim()).filter(|&a| a != lat_axis && a != lon_axis).collect();
    let kept_shape: Vec<usize> = order.iter().map(|&a| data.data().len_of(Axis(a))).collect();
    let dims: Vec<String> = order.iter().map(|&a| data.dims()[a].clone()).collect();
    let coords = order.iter().map(|&a| data.coords()[a].clone()).collect();
    order.push(lat_axis);
    order.push(lon_axis);

    let cells = data.data().len_of(Axis(lat_axis)) * data.data().len_of(Axis(lon_axis));
    let values: Vec<T> = data.data().view().permuted_axes(IxDyn(&order)).iter().copied().collect();
    let output_size: usize = kept_shape.iter().product();

    tracing::debug!(
        operation = operation.as_str(),
        outputs = output_size,
        threads = rayon::current_num_threads(),
        "Reducing spatial axes"
    );

    let reduced: Vec<T> = (0..output_size)
        .into_par_iter()
        .map(|i| operation.reduce(&values[i * cells..(i + 1) * cells]))
        .collect();

    LabeledArray::new(ArrayD::from_shape_vec(IxDyn(&kept_shape), reduced)?, dims, coords)
}

/// Cell count and total area of one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneArea {
    pub zone: String,
    pub cells: usize,
    pub area: f64,
}

/// Per-zone cell count and area of a grid on a sphere of `radius`
///
/// The grid's cell-area array is masked by `masker`, optionally in blocks of
/// `chunk` x `chunk` cells, and summed per zone.
///
/// # Errors
///
/// Propagates masking errors.
pub fn zone_area_summary(
    masker: &ZoneMasker,
    grid: &RegularGrid,
    radius: f64,
    chunk: Option<usize>,
) -> Result<Vec<ZoneArea>> {
    let mut areas = grid.cell_areas(radius)?;
    if let Some(size) = chunk {
        areas = areas.chunk(&[(LAT_DIM, size), (LON_DIM, size)])?;
    }

    let masked = masker.apply(&areas, DEFAULT_ZONE_DIM)?;
    let totals = reduce_spatial(&masked, ZonalOperation::Sum)?;
    let counts = reduce_spatial(&masked, ZonalOperation::Count)?;

    Ok(masker
        .zones()
        .iter()
        .zip(totals.data().iter().zip(counts.data().iter()))
        .map(|(zone, (&area, &cells))| ZoneArea {
            zone: zone.clone(),
            cells: cells as usize,
            area,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeled::CoordLabels;
    use ndarray::Array;

    fn masked_sample() -> LabeledArray<f64> {
        // zone x lat x lon, zone "b" entirely missing
        let mut data = Array::from_shape_fn(IxDyn(&[2, 2, 3]), |ix| (ix[1] * 3 + ix[2]) as f64);
        data[[0, 0, 0]] = f64::NAN;
        data.index_axis_mut(Axis(0), 1).fill(f64::NAN);
        LabeledArray::new(
            data,
            vec!["zone".into(), "lat".into(), "lon".into()],
            vec![
                CoordLabels::names(&["a", "b"]),
                CoordLabels::Numeric(vec![1.0, 0.0]),
                CoordLabels::Numeric(vec![0.0, 1.0, 2.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_operations_skip_missing() {
        let data = masked_sample();
        let sum = reduce_spatial(&data, ZonalOperation::Sum).unwrap();
        assert_eq!(sum.dims(), &["zone".to_string()]);
        assert_eq!(sum.coord("zone").unwrap(), &CoordLabels::names(&["a", "b"]));
        assert_eq!(sum.data()[[0]], 15.0);
        assert_eq!(sum.data()[[1]], 0.0);

        let count = reduce_spatial(&data, ZonalOperation::Count).unwrap();
        assert_eq!(count.data()[[0]], 5.0);
        assert_eq!(count.data()[[1]], 0.0);

        let mean = reduce_spatial(&data, ZonalOperation::Mean).unwrap();
        assert_eq!(mean.data()[[0]], 3.0);
        assert!(mean.data()[[1]].is_nan());

        let min = reduce_spatial(&data, ZonalOperation::Min).unwrap();
        let max = reduce_spatial(&data, ZonalOperation::Max).unwrap();
        assert_eq!(min.data()[[0]], 1.0);
        assert_eq!(max.data()[[0]], 5.0);
        assert!(max.data()[[1]].is_nan());
    }

    #[test]
    fn test_reduce_two_dimensional_gives_scalar() {
        let data = masked_sample().select("zone", "a").unwrap();
        let sum = reduce_spatial(&data, ZonalOperation::Sum).unwrap();
        assert_eq!(sum.ndim(), 0);
        assert_eq!(sum.data().iter().next().copied(), Some(15.0));
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(ZonalOperation::Sum.as_str(), "sum");
        assert_eq!(ZonalOperation::Count.as_str(), "count");
    }
}
