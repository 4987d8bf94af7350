//! Core partitioning: splitting total work units into near-equal per-core
//! chunks.
//!
//! Remainder work is concentrated on one designated tail core, never spread
//! round-robin. Device kernels address their slice as `core_idx *
//! per_core_count`, so the imbalanced-but-predictable split is part of the
//! host/device contract and must not be rebalanced here.

use log::debug;

use crate::arith::{ceil_align, ceil_div};
use crate::error::{TilingError, TilingResult};

/// Per-core work assignment.
///
/// Cores `0..used_cores-1` each own `per_core_count` units; the last used
/// core owns `tail_count`. Identity:
/// `(used_cores - 1) * per_core_count + tail_count == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    pub used_cores: u32,
    pub per_core_count: i64,
    pub tail_count: i64,
}

impl PartitionPlan {
    /// A plan with no work and no used cores.
    pub const EMPTY: PartitionPlan =
        PartitionPlan { used_cores: 0, per_core_count: 0, tail_count: 0 };

    /// Total units covered by this plan.
    pub fn total(&self) -> i64 {
        if self.used_cores == 0 {
            return 0;
        }
        (self.used_cores as i64 - 1) * self.per_core_count + self.tail_count
    }

    /// Units assigned to `core` (must be `< used_cores`).
    pub fn assigned(&self, core: u32) -> i64 {
        debug_assert!(core < self.used_cores);
        if core + 1 == self.used_cores {
            self.tail_count
        } else {
            self.per_core_count
        }
    }

    /// Half-open global index range owned by `core`. Ranges are pairwise
    /// disjoint and collectively cover `[0, total)`.
    pub fn range(&self, core: u32) -> (i64, i64) {
        let start = core as i64 * self.per_core_count;
        (start, start + self.assigned(core))
    }
}

/// Split `total_work_units` across at most `core_count` cores, keeping every
/// per-core count a multiple of `inner_group_len`.
///
/// `inner_group_len` is the smallest contiguous run one core may own (1 when
/// unconstrained); `total_work_units` must be a multiple of it.
///
/// When there are fewer groups than cores, each used core takes exactly one
/// group and the rest stay idle.
pub fn partition(
    total_work_units: i64,
    inner_group_len: i64,
    core_count: u32,
) -> TilingResult<PartitionPlan> {
    if core_count == 0 {
        return Err(TilingError::config("cannot partition across zero cores"));
    }
    if total_work_units < 0 {
        return Err(TilingError::shape(format!(
            "negative work unit count {total_work_units}"
        )));
    }
    if total_work_units == 0 {
        return Ok(PartitionPlan::EMPTY);
    }
    let inner = inner_group_len.max(1);
    if total_work_units % inner != 0 {
        return Err(TilingError::shape(format!(
            "work units {total_work_units} not a multiple of inner group {inner}"
        )));
    }

    let groups = total_work_units / inner;
    let groups_per_core = groups / core_count as i64;
    let remainder_groups = groups % core_count as i64;

    let plan = if groups_per_core > 0 {
        // Tail core absorbs the whole remainder on top of its even share.
        PartitionPlan {
            used_cores: core_count,
            per_core_count: groups_per_core * inner,
            tail_count: (groups_per_core + remainder_groups) * inner,
        }
    } else {
        // Fewer groups than cores: one group per used core.
        PartitionPlan {
            used_cores: remainder_groups as u32,
            per_core_count: inner,
            tail_count: inner,
        }
    };
    debug!(
        "partition: total={total_work_units} inner={inner} cores={core_count} -> \
         used={} per_core={} tail={}",
        plan.used_cores, plan.per_core_count, plan.tail_count
    );
    debug_assert_eq!(plan.total(), total_work_units);
    Ok(plan)
}

/// Variant used by the RNG-family operators: each core's share is rounded
/// up to `align_elems` (and at least `min_per_core`), then the used-core
/// count is re-derived. The tail core here carries the short leftover, the
/// rest carry the aligned share; the coverage identity is the same.
pub fn partition_aligned(
    total_work_units: i64,
    align_elems: i64,
    min_per_core: i64,
    core_count: u32,
) -> TilingResult<PartitionPlan> {
    if core_count == 0 {
        return Err(TilingError::config("cannot partition across zero cores"));
    }
    if total_work_units < 0 {
        return Err(TilingError::shape(format!(
            "negative work unit count {total_work_units}"
        )));
    }
    if total_work_units == 0 {
        return Ok(PartitionPlan::EMPTY);
    }
    let align = align_elems.max(1);
    let share = ceil_div(total_work_units, core_count as i64);
    let per_core = ceil_align(share, align).max(min_per_core.max(1));
    let used = ceil_div(total_work_units, per_core);
    let plan = PartitionPlan {
        used_cores: used as u32,
        per_core_count: per_core,
        tail_count: total_work_units - (used - 1) * per_core,
    };
    debug!(
        "partition_aligned: total={total_work_units} align={align} min={min_per_core} \
         cores={core_count} -> used={} per_core={} tail={}",
        plan.used_cores, plan.per_core_count, plan.tail_count
    );
    debug_assert_eq!(plan.total(), total_work_units);
    Ok(plan)
}
