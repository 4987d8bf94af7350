//! Strided slice: begin/end/stride per axis, negative indices and negative
//! strides allowed.
//!
//! The output shape is derived and validated first; an empty result (any
//! axis sliced to nothing) short-circuits to zero used cores. Work is
//! partitioned in whole output rows so a core never splits the innermost
//! axis across a DMA transfer.

use crate::error::TilingResult;
use crate::key::KeySpace;
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, SliceSpec, TensorShape};
use crate::types::DType;

pub const KEY_SPACE: KeySpace = KeySpace::new(500, 2);

const BRANCH_FORWARD: u8 = 0;
const BRANCH_REVERSED: u8 = 1;

#[derive(Debug, Clone)]
pub struct StridedSliceTiling {
    pub input: TensorShape,
    pub spec: SliceSpec,
    pub dtype: DType,
}

impl TilingStrategy for StridedSliceTiling {
    fn name(&self) -> &'static str {
        "strided_slice"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.dtype.require_in(&DType::ALL, "strided_slice")?;
        self.input.require_min_rank(1, "strided_slice")?;
        let output = self.spec.output_shape(&self.input)?;

        let normalized = if output.is_empty() {
            NormalizedShape { total_work_units: 0, inner_group_len: 1 }
        } else {
            NormalizedShape {
                total_work_units: output.elem_count(),
                inner_group_len: output.dim(output.rank() - 1),
            }
        };
        let reversed = self.spec.strides.iter().any(|&s| s < 0);
        let branch = if reversed { BRANCH_REVERSED } else { BRANCH_FORWARD };

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
        let output = self.spec.output_shape(&self.input)?;
        desc.push(self.input.rank() as u64);
        for i in 0..self.input.rank() {
            desc.push_i64(self.input.dim(i));
            desc.push_i64(output.dim(i));
            desc.push_i64(self.spec.begin[i]);
            desc.push_i64(self.spec.strides[i]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run;

    fn slice(
        input: &[i64],
        begin: &[i64],
        end: &[i64],
        strides: &[i64],
        dtype: DType,
    ) -> StridedSliceTiling {
        StridedSliceTiling {
            input: TensorShape::new(input).unwrap(),
            spec: SliceSpec {
                begin: begin.to_vec(),
                end: end.to_vec(),
                strides: strides.to_vec(),
            },
            dtype,
        }
    }

    #[test]
    fn rows_stay_whole_per_core() {
        let op = slice(&[64, 512], &[0, 128], &[64, 384], &[1, 1], DType::F32);
        let out = run(&HardwareProfile::aiv48(), &op).unwrap();
        // Output is 64 x 256; each core's share is a multiple of 256.
        assert_eq!(out.partition.per_core_count % 256, 0);
        assert_eq!(out.partition.total(), 64 * 256);
    }

    #[test]
    fn empty_slice_uses_no_cores() {
        let op = slice(&[64, 512], &[10, 0], &[10, 512], &[1, 1], DType::F32);
        let out = run(&HardwareProfile::aiv48(), &op).unwrap();
        assert_eq!(out.used_cores, 0);
    }

    #[test]
    fn negative_stride_selects_reversed_branch() {
        let op = slice(&[1024], &[1023], &[-1025], &[-1], DType::F16);
        let analysis = op.analyze(&HardwareProfile::aiv48()).unwrap();
        assert_eq!(analysis.tiling_key, KEY_SPACE.encode(DType::F16.code(), 1));
    }

    #[test]
    fn negative_indices_resolve_against_dim() {
        let op = slice(&[100], &[-50], &[-10], &[2], DType::I32);
        let analysis = op.analyze(&HardwareProfile::aiv48()).unwrap();
        assert_eq!(analysis.normalized.total_work_units, 20);
    }
}
