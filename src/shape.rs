//! Shape normalization: collapsing N-dimensional tensors into the scalar
//! quantities the partitioner consumes.
//!
//! Hardware limits rank to 8. Dynamic dims are reported by the framework as
//! -1; a shape containing one must never reach the partitioner, so it is
//! rejected here.

use crate::error::{TilingError, TilingResult};

/// Hardware rank limit.
pub const MAX_RANK: usize = 8;

/// An ordered, immutable sequence of dimension sizes, rank 0..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorShape {
    dims: [i64; MAX_RANK],
    rank: usize,
}

impl TensorShape {
    /// Build a shape from the dims the framework reports. Rejects rank > 8
    /// and unknown (-1 or any negative) dims.
    pub fn new(dims: &[i64]) -> TilingResult<Self> {
        if dims.len() > MAX_RANK {
            return Err(TilingError::shape(format!(
                "rank {} exceeds hardware limit {MAX_RANK}",
                dims.len()
            )));
        }
        let mut buf = [0i64; MAX_RANK];
        for (i, &d) in dims.iter().enumerate() {
            if d < 0 {
                return Err(TilingError::shape(format!(
                    "dim {i} is {d}; dynamic dims must be resolved before tiling"
                )));
            }
            buf[i] = d;
        }
        Ok(TensorShape { dims: buf, rank: dims.len() })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn dims(&self) -> &[i64] {
        &self.dims[..self.rank]
    }

    pub fn dim(&self, i: usize) -> i64 {
        self.dims[i]
    }

    /// True when any dim is 0: the tensor holds no elements and partitioning
    /// short-circuits to zero used cores.
    pub fn is_empty(&self) -> bool {
        self.dims().iter().any(|&d| d == 0)
    }

    /// Total element count; 0 for an empty tensor, 1 for rank 0 (a scalar).
    pub fn elem_count(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        self.dims().iter().product::<i64>().max(1)
    }

    /// Minimum-rank guard used by operators that need at least `min` dims.
    pub fn require_min_rank(&self, min: usize, op: &str) -> TilingResult<()> {
        if self.rank < min {
            return Err(TilingError::shape(format!(
                "{op} requires rank >= {min}, got rank {}",
                self.rank
            )));
        }
        Ok(())
    }
}

/// Output of shape normalization: everything the partitioner needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedShape {
    /// Total units of work to spread across cores.
    pub total_work_units: i64,
    /// Smallest contiguous run a single core may own. 1 when no constraint
    /// exists; the innermost spatial length when splitting it would break
    /// contiguity (e.g. the depth axis of a 3D circular pad).
    pub inner_group_len: i64,
}

impl NormalizedShape {
    /// Flatten every element into independent work units.
    pub fn elementwise(shape: &TensorShape) -> NormalizedShape {
        NormalizedShape { total_work_units: shape.elem_count(), inner_group_len: 1 }
    }

    /// Treat the leading `rank - spatial_rank` dims as batch, one work unit
    /// per batch index. With `grouped_axis` set (an axis inside the batch
    /// region), the work units spanning that axis stay together on one core.
    pub fn batched(
        shape: &TensorShape,
        spatial_rank: usize,
        grouped_axis: Option<usize>,
    ) -> TilingResult<NormalizedShape> {
        shape.require_min_rank(spatial_rank, "batched normalization")?;
        if shape.is_empty() {
            return Ok(NormalizedShape { total_work_units: 0, inner_group_len: 1 });
        }
        let batch_rank = shape.rank() - spatial_rank;
        let mut total = 1i64;
        for &d in &shape.dims()[..batch_rank] {
            total *= d.max(1);
        }
        let inner = match grouped_axis {
            Some(axis) => {
                debug_assert!(axis < batch_rank);
                shape.dim(axis).max(1)
            }
            None => 1,
        };
        Ok(NormalizedShape { total_work_units: total, inner_group_len: inner })
    }
}

/// Per-axis (before, after) padding deltas. Negative deltas crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadSpec {
    pub deltas: Vec<(i64, i64)>,
}

impl PadSpec {
    pub fn new(deltas: Vec<(i64, i64)>) -> Self {
        PadSpec { deltas }
    }

    /// Validate `out == in + before + after >= 0` for one axis and return
    /// the output size. Runs before any partitioning is attempted.
    pub fn padded_dim(&self, axis: usize, input_dim: i64, axis_name: &str) -> TilingResult<i64> {
        let (before, after) = self.deltas[axis];
        let out = input_dim + before + after;
        if out < 0 {
            return Err(TilingError::shape(format!(
                "{axis_name}: input {input_dim} with pad ({before}, {after}) gives negative size {out}"
            )));
        }
        Ok(out)
    }

    /// Check a caller-declared output dim against the pad identity.
    pub fn check_axis(
        &self,
        axis: usize,
        input_dim: i64,
        output_dim: i64,
        axis_name: &str,
    ) -> TilingResult<()> {
        let expect = self.padded_dim(axis, input_dim, axis_name)?;
        if expect != output_dim {
            return Err(TilingError::shape(format!(
                "{axis_name}: output {output_dim} != input {input_dim} + pads = {expect}"
            )));
        }
        Ok(())
    }
}

/// Begin/end/stride per axis for strided slicing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSpec {
    pub begin: Vec<i64>,
    pub end: Vec<i64>,
    pub strides: Vec<i64>,
}

impl SliceSpec {
    /// Compute and validate the sliced output shape.
    pub fn output_shape(&self, input: &TensorShape) -> TilingResult<TensorShape> {
        let rank = input.rank();
        if self.begin.len() != rank || self.end.len() != rank || self.strides.len() != rank {
            return Err(TilingError::shape(format!(
                "slice spec length ({}, {}, {}) does not match rank {rank}",
                self.begin.len(),
                self.end.len(),
                self.strides.len()
            )));
        }
        let mut out = [0i64; MAX_RANK];
        for i in 0..rank {
            let stride = self.strides[i];
            if stride == 0 {
                return Err(TilingError::shape(format!("axis {i}: stride must be nonzero")));
            }
            let dim = input.dim(i);
            let clamp = |v: i64| -> i64 {
                let v = if v < 0 { v + dim } else { v };
                v.clamp(0, dim)
            };
            let (begin, end) = (clamp(self.begin[i]), clamp(self.end[i]));
            let span = if stride > 0 { end - begin } else { begin - end };
            out[i] = if span <= 0 {
                0
            } else {
                (span + stride.abs() - 1) / stride.abs()
            };
        }
        TensorShape::new(&out[..rank])
    }
}
