//! Circular (wrap-around) padding, 2D and 3D.
//!
//! Pad deltas may be negative (cropping). Shape arithmetic is validated
//! axis by axis — width, then height, then depth for the 3D variant —
//! before any partitioning, so a bad pad spec never reaches the
//! partitioner. The 3D kernel addresses whole depth runs per core, so the
//! output depth length becomes the partition's inner group.

use crate::error::{TilingError, TilingResult};
use crate::key::KeySpace;
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, PadSpec, TensorShape};
use crate::types::DType;

/// 2D variants sit at even offsets, 3D at odd.
pub const KEY_SPACE: KeySpace = KeySpace::new(320, 2);

const BRANCH_2D: u8 = 0;
const BRANCH_3D: u8 = 1;

/// Pad axes, innermost first: `deltas[0]` = width, `[1]` = height,
/// `[2]` = depth (3D only).
#[derive(Debug, Clone)]
pub struct CircularPadTiling {
    pub input: TensorShape,
    pub output: TensorShape,
    pub pads: PadSpec,
    pub dtype: DType,
}

impl CircularPadTiling {
    fn spatial_rank(&self) -> usize {
        self.pads.deltas.len()
    }

    fn validate_axes(&self) -> TilingResult<()> {
        let spatial = self.spatial_rank();
        if spatial != 2 && spatial != 3 {
            return Err(TilingError::shape(format!(
                "circular pad expects 2 or 3 padded axes, got {spatial}"
            )));
        }
        self.input
            .require_min_rank(spatial + 1, "circular pad")?;
        if self.output.rank() != self.input.rank() {
            return Err(TilingError::shape(format!(
                "output rank {} != input rank {}",
                self.output.rank(),
                self.input.rank()
            )));
        }
        // Wrap-around reads need the full source extent at least once.
        let rank = self.input.rank();
        let names = ["width", "height", "depth"];
        for axis in 0..spatial {
            let dim_idx = rank - 1 - axis;
            self.pads.check_axis(
                axis,
                self.input.dim(dim_idx),
                self.output.dim(dim_idx),
                names[axis],
            )?;
            let (before, after) = self.pads.deltas[axis];
            if before.max(0) > self.input.dim(dim_idx) || after.max(0) > self.input.dim(dim_idx) {
                return Err(TilingError::shape(format!(
                    "{}: circular pad ({before}, {after}) exceeds source extent {}",
                    names[axis],
                    self.input.dim(dim_idx)
                )));
            }
        }
        // Batch dims are untouched by padding.
        for i in 0..rank - spatial {
            if self.input.dim(i) != self.output.dim(i) {
                return Err(TilingError::shape(format!(
                    "batch dim {i}: output {} != input {}",
                    self.output.dim(i),
                    self.input.dim(i)
                )));
            }
        }
        Ok(())
    }
}

impl TilingStrategy for CircularPadTiling {
    fn name(&self) -> &'static str {
        "circular_pad"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.dtype.require_in(&DType::ALL, "circular_pad")?;
        self.validate_axes()?;

        let spatial = self.spatial_rank();
        let is_3d = spatial == 3;
        let normalized = if is_3d {
            // Depth runs stay whole on one core.
            let depth_axis = self.output.rank() - 3;
            let mut n = NormalizedShape::elementwise(&self.output);
            if n.total_work_units > 0 {
                n.inner_group_len = self.output.dim(depth_axis).max(1);
            }
            n
        } else {
            NormalizedShape::elementwise(&self.output)
        };

        let branch = if is_3d { BRANCH_3D } else { BRANCH_2D };
        Ok(OpAnalysis {
            normalized,
            elem_bytes: self.dtype.size_bytes(),
            buffer_multiplier: 2,
            align_bytes: 32,
            tiling_key: KEY_SPACE.encode(self.dtype.code(), branch),
            per_unit_workspace_elems: 0,
        })
    }

    fn extend_descriptor(
        &self,
        _analysis: &OpAnalysis,
        _profile: &HardwareProfile,
        desc: &mut crate::descriptor::TilingDescriptor,
    ) -> TilingResult<()> {
        let spatial = self.spatial_rank();
        let rank = self.input.rank();
        for axis in 0..spatial {
            let dim_idx = rank - 1 - axis;
            desc.push_i64(self.input.dim(dim_idx));
            desc.push_i64(self.output.dim(dim_idx));
            let (before, after) = self.pads.deltas[axis];
            desc.push_i64(before);
            desc.push_i64(after);
        }
        Ok(())
    }
}
