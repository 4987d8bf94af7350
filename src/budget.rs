//! Scratch-memory budgeting: how many passes one core needs to stream its
//! work through on-chip scratch, and the chunk size per pass.
//!
//! The copy engine moves data in 32-byte blocks, so chunks are floored to a
//! block multiple. Double buffering halves the usable budget: under-counting
//! the multiplier means an out-of-bounds scratch access on device,
//! over-counting wastes half the throughput, so the bound is honored exactly.

use log::debug;

use crate::arith::{ceil_div, floor_align};
use crate::error::{TilingError, TilingResult};

/// Per-core loop schedule.
///
/// Identity: `(loops_per_core - 1) * chunk_elems + last_chunk_elems ==
/// per_core_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetPlan {
    /// Elements moved per full pass; a multiple of the alignment unit.
    pub chunk_elems: i64,
    /// Number of passes, counting the final short one.
    pub loops_per_core: i64,
    /// Elements in the final pass.
    pub last_chunk_elems: i64,
}

impl BudgetPlan {
    /// Schedule for a core with nothing to do.
    pub const IDLE: BudgetPlan =
        BudgetPlan { chunk_elems: 0, loops_per_core: 0, last_chunk_elems: 0 };

    /// Total elements covered by the schedule.
    pub fn total(&self) -> i64 {
        if self.loops_per_core == 0 {
            return 0;
        }
        (self.loops_per_core - 1) * self.chunk_elems + self.last_chunk_elems
    }
}

/// Compute the loop schedule for `per_core_count` elements of width
/// `elem_bytes` under `scratch_bytes` of on-chip memory.
///
/// `buffer_multiplier` is 2 for double-buffered operators, 1 when load and
/// compute do not overlap. `align_bytes` is the copy-engine block size.
pub fn budget(
    per_core_count: i64,
    elem_bytes: u32,
    scratch_bytes: u64,
    buffer_multiplier: u32,
    align_bytes: u32,
) -> TilingResult<BudgetPlan> {
    if scratch_bytes == 0 {
        return Err(TilingError::config("scratch_bytes == 0"));
    }
    if elem_bytes == 0 {
        return Err(TilingError::config("elem_bytes == 0"));
    }
    let mult = buffer_multiplier.max(1) as u64;
    let align_unit = (align_bytes / elem_bytes).max(1) as i64;

    let usable_bytes = scratch_bytes / mult;
    let chunk_raw = (usable_bytes / elem_bytes as u64) as i64;
    let chunk_elems = floor_align(chunk_raw, align_unit);
    if chunk_elems == 0 {
        return Err(TilingError::InsufficientScratch {
            needed: align_unit as u64 * elem_bytes as u64 * mult,
            available: scratch_bytes,
        });
    }

    if per_core_count <= 0 {
        return Ok(BudgetPlan::IDLE);
    }

    let loops_per_core = ceil_div(per_core_count, chunk_elems);
    let last_chunk_elems = per_core_count - (loops_per_core - 1) * chunk_elems;
    let plan = BudgetPlan { chunk_elems, loops_per_core, last_chunk_elems };
    debug!(
        "budget: per_core={per_core_count} elem_bytes={elem_bytes} scratch={scratch_bytes} \
         x{mult} -> chunk={chunk_elems} loops={loops_per_core} last={last_chunk_elems}"
    );
    debug_assert_eq!(plan.total(), per_core_count);
    debug_assert!(chunk_elems as u64 * elem_bytes as u64 * mult <= scratch_bytes);
    Ok(plan)
}
