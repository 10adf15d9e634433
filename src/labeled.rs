//! Labeled N-dimensional arrays
//!
//! A [`LabeledArray`] pairs an `ndarray` array with a name and a set of
//! coordinate labels for every axis, plus an optional [`ChunkLayout`]
//! describing how the array is split into independently processable blocks.

use crate::chunks::ChunkLayout;
use crate::errors::{GridZoneError, Result};
use ndarray::{ArrayD, Axis};
use std::collections::HashSet;

/// Coordinate labels along one axis
#[derive(Debug, Clone, PartialEq)]
pub enum CoordLabels {
    /// Numeric labels such as latitudes or time offsets
    Numeric(Vec<f64>),
    /// String labels such as zone names
    Names(Vec<String>),
    /// No explicit labels; positions `0..n`
    Positional(usize),
}

impl CoordLabels {
    /// Number of labels
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            CoordLabels::Numeric(values) => values.len(),
            CoordLabels::Names(names) => names.len(),
            CoordLabels::Positional(n) => *n,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric labels, if the axis has them
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            CoordLabels::Numeric(values) => Some(values),
            _ => None,
        }
    }

    /// String labels, if the axis has them
    #[must_use]
    pub fn as_names(&self) -> Option<&[String]> {
        match self {
            CoordLabels::Names(names) => Some(names),
            _ => None,
        }
    }

    /// Build string labels from anything string-like
    pub fn names<S: AsRef<str>>(names: &[S]) -> Self {
        CoordLabels::Names(names.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

/// N-dimensional array with named axes and coordinate labels
#[derive(Debug, Clone)]
pub struct LabeledArray<T> {
    data: ArrayD<T>,
    dims: Vec<String>,
    coords: Vec<CoordLabels>,
    chunks: Option<ChunkLayout>,
}

impl<T> LabeledArray<T> {
    /// Create a labeled array
    ///
    /// # Errors
    ///
    /// Returns an error if the number of dimension names or coordinate axes
    /// differs from the array's dimensionality, a coordinate axis has the
    /// wrong length, or a dimension name repeats.
    pub fn new(data: ArrayD<T>, dims: Vec<String>, coords: Vec<CoordLabels>) -> Result<Self> {
        if dims.len() != data.ndim() {
            return Err(GridZoneError::ShapeMismatch {
                expected: data.shape().to_vec(),
                actual: vec![dims.len()],
            });
        }

        let mut seen = HashSet::new();
        for dim in &dims {
            if !seen.insert(dim.as_str()) {
                return Err(GridZoneError::DimensionExists { dim: dim.clone() });
            }
        }

        if coords.len() != dims.len() {
            return Err(GridZoneError::ShapeMismatch {
                expected: data.shape().to_vec(),
                actual: coords.iter().map(CoordLabels::len).collect(),
            });
        }
        for ((dim, coord), &len) in dims.iter().zip(&coords).zip(data.shape()) {
            if coord.len() != len {
                return Err(GridZoneError::InvalidCoordinate {
                    dim: dim.clone(),
                    message: format!("{} labels for axis of length {len}", coord.len()),
                });
            }
        }

        Ok(Self {
            data,
            dims,
            coords,
            chunks: None,
        })
    }

    /// Create a labeled array with positional coordinates on every axis
    ///
    /// # Errors
    ///
    /// See [`LabeledArray::new`].
    pub fn from_dims<S: AsRef<str>>(data: ArrayD<T>, dims: &[S]) -> Result<Self> {
        let coords = data.shape().iter().map(|&n| CoordLabels::Positional(n)).collect();
        let dims = dims.iter().map(|d| d.as_ref().to_string()).collect();
        Self::new(data, dims, coords)
    }

    /// The underlying array
    #[must_use]
    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Consume the labeled array and return the underlying array
    #[must_use]
    pub fn into_data(self) -> ArrayD<T> {
        self.data
    }

    /// Dimension names in axis order
    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Coordinate labels in axis order
    #[must_use]
    pub fn coords(&self) -> &[CoordLabels] {
        &self.coords
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Axis index of a named dimension
    ///
    /// # Errors
    ///
    /// Returns [`GridZoneError::DimensionNotFound`] if no axis has that name.
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| GridZoneError::DimensionNotFound {
                dim: dim.to_string(),
                available: self.dims.clone(),
            })
    }

    /// Coordinate labels of a named dimension
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist.
    pub fn coord(&self, dim: &str) -> Result<&CoordLabels> {
        Ok(&self.coords[self.axis_of(dim)?])
    }

    /// Numeric coordinate labels of a named dimension
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist or its labels are not numeric.
    pub fn numeric_coord(&self, dim: &str) -> Result<&[f64]> {
        self.coord(dim)?
            .as_numeric()
            .ok_or_else(|| GridZoneError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "labels are not numeric".to_string(),
            })
    }

    /// Replace the coordinate labels of a dimension
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist or the label count
    /// does not match the axis length.
    pub fn assign_coords(&mut self, dim: &str, labels: CoordLabels) -> Result<()> {
        let axis = self.axis_of(dim)?;
        let len = self.data.len_of(Axis(axis));
        if labels.len() != len {
            return Err(GridZoneError::InvalidCoordinate {
                dim: dim.to_string(),
                message: format!("{} labels for axis of length {len}", labels.len()),
            });
        }
        self.coords[axis] = labels;
        Ok(())
    }

    /// Chunk layout, if the array is chunked
    #[must_use]
    pub fn chunks(&self) -> Option<&ChunkLayout> {
        self.chunks.as_ref()
    }

    #[must_use]
    pub fn is_chunked(&self) -> bool {
        self.chunks.is_some()
    }

    /// Split the array into regular chunks along the named dimensions;
    /// unnamed dimensions stay in one chunk.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown dimensions or zero chunk sizes.
    pub fn chunk(mut self, sizes: &[(&str, usize)]) -> Result<Self> {
        let mut per_axis: Vec<usize> = self.shape().iter().map(|&n| n.max(1)).collect();
        for &(dim, size) in sizes {
            per_axis[self.axis_of(dim)?] = size;
        }
        self.chunks = Some(ChunkLayout::regular(&self.dims, self.data.shape(), &per_axis)?);
        Ok(self)
    }

    /// Attach an explicit chunk layout
    ///
    /// # Errors
    ///
    /// Returns an error if the layout does not match the array's shape.
    pub fn with_chunks(mut self, layout: ChunkLayout) -> Result<Self> {
        let layout = ChunkLayout::explicit(&self.dims, self.data.shape(), layout.chunks().to_vec())?;
        self.chunks = Some(layout);
        Ok(self)
    }

    /// Insert a new leading axis of length 1 with positional labels
    ///
    /// # Errors
    ///
    /// Returns an error if `dim` already names an axis.
    pub fn expand_dims(self, dim: &str) -> Result<Self> {
        if self.dims.iter().any(|d| d == dim) {
            return Err(GridZoneError::DimensionExists { dim: dim.to_string() });
        }

        let chunks = self.chunks.as_ref().map(|layout| layout.prepend_axis(1));
        let mut dims = Vec::with_capacity(self.dims.len() + 1);
        dims.push(dim.to_string());
        dims.extend(self.dims);
        let mut coords = Vec::with_capacity(self.coords.len() + 1);
        coords.push(CoordLabels::Positional(1));
        coords.extend(self.coords);

        Ok(Self {
            data: self.data.insert_axis(Axis(0)),
            dims,
            coords,
            chunks,
        })
    }
}

impl<T: Clone> LabeledArray<T> {
    /// Select the slice at a string label along a dimension, dropping that axis
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist, has no string labels,
    /// or does not contain `label`.
    pub fn select(&self, dim: &str, label: &str) -> Result<LabeledArray<T>> {
        let axis = self.axis_of(dim)?;
        let names = self.coords[axis]
            .as_names()
            .ok_or_else(|| GridZoneError::InvalidCoordinate {
                dim: dim.to_string(),
                message: "labels are not names".to_string(),
            })?;
        let index = names
            .iter()
            .position(|n| n == label)
            .ok_or_else(|| GridZoneError::InvalidCoordinate {
                dim: dim.to_string(),
                message: format!("no label '{label}'"),
            })?;

        let mut dims = self.dims.clone();
        dims.remove(axis);
        let mut coords = self.coords.clone();
        coords.remove(axis);

        LabeledArray::new(self.data.index_axis(Axis(axis), index).to_owned(), dims, coords)
    }
}
