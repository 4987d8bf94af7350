//! Diagonal extraction / embedding over a flattened input.
//!
//! Tiny inputs are not worth spreading: when the whole input fits in one
//! vector register's worth of lanes, a single core finishes it faster than
//! the launch overhead of many, so the scalar branch pins the plan to one
//! core.

use crate::error::TilingResult;
use crate::key::KeySpace;
use crate::partition::{partition, PartitionPlan};
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

pub const KEY_SPACE: KeySpace = KeySpace::new(400, 2);

/// Vector register width in bytes; inputs at or below this take the scalar
/// single-core branch.
pub const SCALAR_THRESHOLD_BYTES: i64 = 256;

const BRANCH_VECTOR: u8 = 0;
const BRANCH_SCALAR: u8 = 1;

pub const SUPPORTED: &[DType] = &[
    DType::F32,
    DType::F16,
    DType::BF16,
    DType::I32,
    DType::I64,
    DType::U8,
    DType::I8,
];

#[derive(Debug, Clone)]
pub struct DiagFlatTiling {
    pub input: TensorShape,
    pub dtype: DType,
    /// Diagonal offset; positive is above the main diagonal.
    pub offset: i64,
}

impl DiagFlatTiling {
    fn input_num(&self) -> i64 {
        self.input.elem_count()
    }

    fn is_scalar_case(&self) -> bool {
        let n = self.input_num();
        n > 0 && n * self.dtype.size_bytes() as i64 <= SCALAR_THRESHOLD_BYTES
    }
}

impl TilingStrategy for DiagFlatTiling {
    fn name(&self) -> &'static str {
        "diag_flat"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.dtype.require_in(SUPPORTED, "diag_flat")?;
        self.input.require_min_rank(1, "diag_flat")?;
        let branch = if self.is_scalar_case() { BRANCH_SCALAR } else { BRANCH_VECTOR };
        Ok(OpAnalysis {
            normalized: NormalizedShape {
                total_work_units: self.input_num(),
                inner_group_len: 1,
            },
            elem_bytes: self.dtype.size_bytes(),
            buffer_multiplier: 2,
            align_bytes: 32,
            tiling_key: KEY_SPACE.encode(self.dtype.code(), branch),
            // Output matrix is written row by row through off-chip scratch:
            // one output row per diagonal element.
            per_unit_workspace_elems: self.input_num() + self.offset.abs(),
        })
    }

    fn partition(
        &self,
        analysis: &OpAnalysis,
        profile: &HardwareProfile,
    ) -> TilingResult<PartitionPlan> {
        let total = analysis.normalized.total_work_units;
        if total > 0 && self.is_scalar_case() {
            return Ok(PartitionPlan { used_cores: 1, per_core_count: total, tail_count: total });
        }
        partition(total, 1, profile.core_count)
    }

    fn extend_descriptor(
        &self,
        _analysis: &OpAnalysis,
        _profile: &HardwareProfile,
        desc: &mut crate::descriptor::TilingDescriptor,
    ) -> TilingResult<()> {
        desc.push_i64(self.offset);
        Ok(())
    }
}
