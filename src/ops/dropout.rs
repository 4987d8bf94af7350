//! Dropout mask generation.
//!
//! The kernel emits one mask bit per element, so per-core counts are kept
//! multiples of 128 elements: the mask bytes of a core's slice then start
//! and end on 16-byte boundaries and cores never share a mask byte.

use crate::error::{TilingError, TilingResult};
use crate::key::KeySpace;
use crate::partition::{partition_aligned, PartitionPlan};
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

pub const KEY_SPACE: KeySpace = KeySpace::new(800, 2);

/// Mask-bit granularity per core.
pub const MASK_ALIGN_ELEMS: i64 = 128;

const BRANCH_BIT_MASK: u8 = 0;
const BRANCH_BYTE_MASK: u8 = 1;

#[derive(Debug, Clone)]
pub struct DropoutTiling {
    pub input: TensorShape,
    pub dtype: DType,
    /// Probability of zeroing an element, in [0, 1].
    pub prob: f32,
    pub seed: i64,
    pub offset: i64,
    /// Emit one byte per element instead of one bit.
    pub byte_mask: bool,
}

impl TilingStrategy for DropoutTiling {
    fn name(&self) -> &'static str {
        "dropout"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.dtype.require_in(
            &[DType::F32, DType::F16, DType::BF16],
            "dropout",
        )?;
        if !(0.0..=1.0).contains(&self.prob) {
            return Err(TilingError::shape(format!(
                "dropout probability {} outside [0, 1]",
                self.prob
            )));
        }
        let branch = if self.byte_mask { BRANCH_BYTE_MASK } else { BRANCH_BIT_MASK };
        Ok(OpAnalysis {
            normalized: NormalizedShape::elementwise(&self.input),
            // The mask is staged in scratch one byte per element before the
            // bit pack, regardless of the input width.
            elem_bytes: 1,
            buffer_multiplier: 2,
            align_bytes: MASK_ALIGN_ELEMS as u32,
            tiling_key: KEY_SPACE.encode(self.dtype.code(), branch),
            per_unit_workspace_elems: 0,
        })
    }

    fn partition(
        &self,
        analysis: &OpAnalysis,
        profile: &HardwareProfile,
    ) -> TilingResult<PartitionPlan> {
        partition_aligned(
            analysis.normalized.total_work_units,
            MASK_ALIGN_ELEMS,
            MASK_ALIGN_ELEMS,
            profile.core_count,
        )
    }

    fn extend_descriptor(
        &self,
        analysis: &OpAnalysis,
        _profile: &HardwareProfile,
        desc: &mut crate::descriptor::TilingDescriptor,
    ) -> TilingResult<()> {
        desc.push_i64(self.seed);
        desc.push_i64(self.offset);
        desc.push(self.prob.to_bits() as u64);
        // Mask bytes the kernel will produce in total.
        let total = analysis.normalized.total_work_units;
        let mask_bytes = if self.byte_mask { total } else { (total + 7) / 8 };
        desc.push_i64(mask_bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run;

    fn dropout(n: i64, prob: f32) -> DropoutTiling {
        DropoutTiling {
            input: TensorShape::new(&[n]).unwrap(),
            dtype: DType::F16,
            prob,
            seed: 7,
            offset: 0,
            byte_mask: false,
        }
    }

    #[test]
    fn per_core_counts_are_mask_aligned() {
        let out = run(&HardwareProfile::aiv48(), &dropout(1_000_000, 0.5)).unwrap();
        assert_eq!(out.partition.per_core_count % MASK_ALIGN_ELEMS, 0);
        assert_eq!(out.partition.total(), 1_000_000);
        // Only the tail core may hold a partial 128-run.
        for core in 0..out.used_cores - 1 {
            assert_eq!(out.partition.assigned(core) % MASK_ALIGN_ELEMS, 0);
        }
    }

    #[test]
    fn chunks_are_mask_aligned_too() {
        let out = run(&HardwareProfile::aiv48(), &dropout(1_000_000, 0.1)).unwrap();
        assert_eq!(out.main_budget.chunk_elems % MASK_ALIGN_ELEMS, 0);
    }

    #[test]
    fn out_of_range_prob_rejected() {
        let op = dropout(100, 1.5);
        assert!(matches!(
            op.analyze(&HardwareProfile::aiv48()),
            Err(TilingError::Shape(_))
        ));
    }

    #[test]
    fn byte_mask_branch_changes_key_and_size() {
        let profile = HardwareProfile::aiv48();
        let mut op = dropout(4096, 0.5);
        let bit = run(&profile, &op).unwrap();
        op.byte_mask = true;
        let byte = run(&profile, &op).unwrap();
        assert_ne!(bit.tiling_key, byte.tiling_key);
        let bit_words = bit.descriptor.words();
        let byte_words = byte.descriptor.words();
        assert_eq!(bit_words[bit_words.len() - 1] * 8, byte_words[byte_words.len() - 1]);
    }
}
