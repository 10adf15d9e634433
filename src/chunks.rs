//! Block partitioning of N-dimensional arrays
//!
//! A [`ChunkLayout`] stores, for every axis, the ordered lengths of the chunks
//! along that axis. The blocks of the array are the cartesian product of the
//! per-axis chunks; each [`Block`] knows its offset and extent on every axis,
//! so blocks can be processed independently and written back by position.

use crate::errors::{GridZoneError, Result};
use ndarray::Slice;

/// Per-axis chunk lengths of an array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayout {
    chunks: Vec<Vec<usize>>,
}

/// One independently processable region of a chunked array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position of the block in the block grid
    pub index: Vec<usize>,
    /// Offset of the block's first element along each axis
    pub offsets: Vec<usize>,
    /// Extent of the block along each axis
    pub shape: Vec<usize>,
}

impl Block {
    /// Slice selecting this block along `axis`
    #[must_use]
    pub fn slice(&self, axis: usize) -> Slice {
        let start = self.offsets[axis];
        Slice::from(start..start + self.shape[axis])
    }

    /// Number of elements in the block
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChunkLayout {
    /// A layout with a single chunk spanning every axis
    #[must_use]
    pub fn single(shape: &[usize]) -> Self {
        Self {
            chunks: shape.iter().map(|&n| vec![n]).collect(),
        }
    }

    /// Regular chunks of `sizes[i]` elements along axis `i`; the last chunk
    /// of an axis holds the remainder.
    ///
    /// # Errors
    ///
    /// Returns an error if `sizes` and `shape` differ in length or a size is zero.
    pub fn regular(dims: &[String], shape: &[usize], sizes: &[usize]) -> Result<Self> {
        if sizes.len() != shape.len() {
            return Err(GridZoneError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: sizes.to_vec(),
            });
        }

        let mut chunks = Vec::with_capacity(shape.len());
        for (axis, (&len, &size)) in shape.iter().zip(sizes).enumerate() {
            if size == 0 {
                return Err(GridZoneError::InvalidChunks {
                    dim: axis_name(dims, axis),
                    message: "chunk size must be at least 1".to_string(),
                });
            }
            if len == 0 {
                chunks.push(vec![0]);
                continue;
            }
            let mut axis_chunks = vec![size; len / size];
            if len % size != 0 {
                axis_chunks.push(len % size);
            }
            chunks.push(axis_chunks);
        }

        Ok(Self { chunks })
    }

    /// Explicit per-axis chunk lengths
    ///
    /// # Errors
    ///
    /// Returns an error unless the chunks of every axis sum to that axis' length.
    pub fn explicit(dims: &[String], shape: &[usize], chunks: Vec<Vec<usize>>) -> Result<Self> {
        if chunks.len() != shape.len() {
            return Err(GridZoneError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: chunks.iter().map(|c| c.iter().sum()).collect(),
            });
        }

        for (axis, (axis_chunks, &len)) in chunks.iter().zip(shape).enumerate() {
            if axis_chunks.is_empty() {
                return Err(GridZoneError::InvalidChunks {
                    dim: axis_name(dims, axis),
                    message: "no chunks given".to_string(),
                });
            }
            let total: usize = axis_chunks.iter().sum();
            if total != len {
                return Err(GridZoneError::InvalidChunks {
                    dim: axis_name(dims, axis),
                    message: format!("chunks {axis_chunks:?} sum to {total}, axis length is {len}"),
                });
            }
        }

        Ok(Self { chunks })
    }

    /// Chunk lengths along every axis
    #[must_use]
    pub fn chunks(&self) -> &[Vec<usize>] {
        &self.chunks
    }

    /// Number of axes covered by the layout
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.chunks.len()
    }

    /// Total number of blocks
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.chunks.iter().map(Vec::len).product()
    }

    /// Layout with a single chunk of `len` prepended as a new leading axis
    #[must_use]
    pub fn prepend_axis(&self, len: usize) -> Self {
        let mut chunks = Vec::with_capacity(self.chunks.len() + 1);
        chunks.push(vec![len]);
        chunks.extend(self.chunks.iter().cloned());
        Self { chunks }
    }

    /// Every block of the layout, in row-major block order
    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        let starts: Vec<Vec<usize>> = self
            .chunks
            .iter()
            .map(|axis_chunks| {
                axis_chunks
                    .iter()
                    .scan(0, |acc, &len| {
                        let start = *acc;
                        *acc += len;
                        Some(start)
                    })
                    .collect()
            })
            .collect();

        let mut blocks = Vec::with_capacity(self.num_blocks());
        let mut index = vec![0usize; self.chunks.len()];
        if self.chunks.iter().any(Vec::is_empty) {
            return blocks;
        }

        loop {
            blocks.push(Block {
                offsets: index.iter().enumerate().map(|(a, &i)| starts[a][i]).collect(),
                shape: index.iter().enumerate().map(|(a, &i)| self.chunks[a][i]).collect(),
                index: index.clone(),
            });

            // advance the block index like an odometer, last axis fastest
            let mut axis = index.len();
            loop {
                if axis == 0 {
                    return blocks;
                }
                axis -= 1;
                index[axis] += 1;
                if index[axis] < self.chunks[axis].len() {
                    break;
                }
                index[axis] = 0;
            }
        }
    }
}

fn axis_name(dims: &[String], axis: usize) -> String {
    dims.get(axis).cloned().unwrap_or_else(|| format!("axis {axis}"))
}
