//! Stateless Bernoulli sampling.
//!
//! Counter-based RNG: every core derives its stream from the (seed, offset)
//! pair plus its global element index, so per-core block sizes are rounded
//! up to the counter stride (512 bytes) to keep streams non-overlapping.
//! The UB tile is halved until it divides the per-core block, which lets
//! the kernel advance its counters by a fixed amount per loop.

use crate::arith::{ceil_div, floor_align};
use crate::budget::BudgetPlan;
use crate::error::{TilingError, TilingResult};
use crate::partition::{partition_aligned, PartitionPlan};
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

const KEY_BASE: u64 = 1000;

/// RNG counter stride in bytes; per-core blocks are aligned to it.
pub const CORE_ALIGN_BYTES: i64 = 512;

/// Smallest UB tile worth issuing, in elements.
pub const MIN_TILE_ELEMS: i64 = 256;

pub const OUT_SUPPORTED: &[DType] = &[
    DType::U8,
    DType::I8,
    DType::U16,
    DType::I16,
    DType::U32,
    DType::I32,
    DType::U64,
    DType::I64,
    DType::F16,
    DType::F32,
    DType::BF16,
    DType::Bool,
];

#[derive(Debug, Clone)]
pub struct BernoulliTiling {
    pub shape: TensorShape,
    /// Probability tensor dtype; selects the kernel variant.
    pub prob_dtype: DType,
    /// True when the probability is a single scalar broadcast to all
    /// elements.
    pub prob_scalar: bool,
    pub out_dtype: DType,
    pub seed: i64,
    pub offset: i64,
}

impl BernoulliTiling {
    fn align_elems(&self, elem_bytes: u32) -> i64 {
        (CORE_ALIGN_BYTES / elem_bytes as i64).max(1)
    }
}

impl TilingStrategy for BernoulliTiling {
    fn name(&self) -> &'static str {
        "bernoulli"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.prob_dtype
            .require_in(&[DType::F32, DType::F16, DType::BF16], "bernoulli prob")?;
        self.out_dtype.require_in(OUT_SUPPORTED, "bernoulli output")?;

        let key_addition = match self.prob_dtype {
            DType::F32 => 1,
            DType::F16 => 2,
            _ => 3, // BF16, the only remaining accepted dtype
        };
        Ok(OpAnalysis {
            normalized: NormalizedShape::elementwise(&self.shape),
            elem_bytes: self.out_dtype.size_bytes(),
            buffer_multiplier: 4,
            align_bytes: 32,
            tiling_key: KEY_BASE + key_addition,
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
            self.align_elems(analysis.elem_bytes),
            MIN_TILE_ELEMS,
            profile.core_count,
        )
    }

    fn budget(
        &self,
        analysis: &OpAnalysis,
        count: i64,
        profile: &HardwareProfile,
    ) -> TilingResult<BudgetPlan> {
        // Double buffering x (input node + output node) leaves a quarter of
        // UB for one tile.
        let quarter = (profile.ub_bytes / analysis.buffer_multiplier as u64) as i64;
        let mut tile = floor_align(quarter / analysis.elem_bytes as i64, MIN_TILE_ELEMS);
        if tile == 0 {
            return Err(TilingError::InsufficientScratch {
                needed: (MIN_TILE_ELEMS * analysis.elem_bytes as i64
                    * analysis.buffer_multiplier as i64) as u64,
                available: profile.ub_bytes,
            });
        }
        if count <= 0 {
            return Ok(BudgetPlan::IDLE);
        }
        // Shrink until the tile divides the block so each loop advances the
        // RNG counter by the same amount.
        while count % tile != 0 {
            tile /= 2;
            if tile <= MIN_TILE_ELEMS {
                tile = MIN_TILE_ELEMS;
                break;
            }
        }
        let loops = ceil_div(count, tile);
        Ok(BudgetPlan {
            chunk_elems: tile,
            loops_per_core: loops,
            last_chunk_elems: count - (loops - 1) * tile,
        })
    }

    fn extend_descriptor(
        &self,
        _analysis: &OpAnalysis,
        _profile: &HardwareProfile,
        desc: &mut crate::descriptor::TilingDescriptor,
    ) -> TilingResult<()> {
        // Seed and offset split into 32-bit key/counter words, the layout
        // the counter-based generator consumes.
        desc.push(self.seed as u64 & 0xFFFF_FFFF);
        desc.push((self.seed as u64) >> 32);
        desc.push(0);
        desc.push(0);
        desc.push(self.offset as u64 & 0xFFFF_FFFF);
        desc.push((self.offset as u64) >> 32);
        desc.push(u64::from(self.prob_scalar));
        desc.push(self.out_dtype.code() as u64);
        Ok(())
    }
}
