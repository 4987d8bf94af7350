//! The tiling pipeline: a fixed stage skeleton with operator-specific steps
//! injected through [`TilingStrategy`].
//!
//! Stage order is the one every operator follows: analyze shape and
//! attributes, partition across cores, budget scratch passes, select the
//! kernel variant, pack the descriptor, size the workspace. Data flows
//! strictly forward; the first failing stage aborts the run and nothing
//! partial is ever emitted.

use log::debug;

use crate::budget::{budget, BudgetPlan};
use crate::descriptor::TilingDescriptor;
use crate::error::{TilingError, TilingResult};
use crate::partition::{partition, PartitionPlan};
use crate::platform::HardwareProfile;
use crate::shape::NormalizedShape;

/// Everything the generic stages need to know about one operator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpAnalysis {
    /// Work units and grouping constraint from shape normalization.
    pub normalized: NormalizedShape,
    /// Element byte width driving the scratch budget.
    pub elem_bytes: u32,
    /// 2 for double-buffered operators, 1 when no overlap is needed. Larger
    /// values model extra per-element temporaries sharing the scratch.
    pub buffer_multiplier: u32,
    /// Copy-engine alignment for budgeted chunks, in bytes.
    pub align_bytes: u32,
    /// Kernel-variant discriminator, already encoded.
    pub tiling_key: u64,
    /// Off-chip scratch elements needed per work unit; 0 for in-place ops.
    pub per_unit_workspace_elems: i64,
}

/// One operator's tiling logic: validation plus the knobs the shared
/// skeleton cannot know.
pub trait TilingStrategy {
    fn name(&self) -> &'static str;

    /// Validate shapes, dtypes, and attributes, and normalize the work.
    /// Runs before any partitioning; all `ShapeError`s originate here.
    fn analyze(&self, profile: &HardwareProfile) -> TilingResult<OpAnalysis>;

    /// Split the work across cores. The default is the shared
    /// grouped-remainder split; RNG-family operators override this with
    /// their aligned variant.
    fn partition(
        &self,
        analysis: &OpAnalysis,
        profile: &HardwareProfile,
    ) -> TilingResult<PartitionPlan> {
        partition(
            analysis.normalized.total_work_units,
            analysis.normalized.inner_group_len,
            profile.core_count,
        )
    }

    /// Schedule one core's `count` elements through scratch. The default is
    /// the shared block-aligned budget; operators whose kernels require the
    /// chunk to divide the per-core block override this.
    fn budget(
        &self,
        analysis: &OpAnalysis,
        count: i64,
        profile: &HardwareProfile,
    ) -> TilingResult<BudgetPlan> {
        budget(
            count,
            analysis.elem_bytes,
            profile.ub_bytes,
            analysis.buffer_multiplier,
            analysis.align_bytes,
        )
    }

    /// Append operator-specific fields after the common descriptor prefix.
    fn extend_descriptor(
        &self,
        _analysis: &OpAnalysis,
        _profile: &HardwareProfile,
        _desc: &mut TilingDescriptor,
    ) -> TilingResult<()> {
        Ok(())
    }
}

/// Result of a tiling run, ready to cross the host/device boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilingOutput {
    /// Packed descriptor (common prefix + operator extension).
    pub descriptor: TilingDescriptor,
    /// Reported through its own scalar slot, not the descriptor buffer.
    pub tiling_key: u64,
    /// Reported through its own scalar slot, not the descriptor buffer.
    pub used_cores: u32,
    /// Off-chip workspace bytes to reserve, system reserve included.
    pub workspace_bytes: u64,
    pub partition: PartitionPlan,
    /// Loop schedule for the non-tail cores.
    pub main_budget: BudgetPlan,
    /// Loop schedule for the tail core.
    pub tail_budget: BudgetPlan,
}

/// Run the pipeline for one operator invocation.
pub fn run(profile: &HardwareProfile, op: &dyn TilingStrategy) -> TilingResult<TilingOutput> {
    // Fail fast on a broken platform query before touching shapes.
    if profile.core_count == 0 {
        return Err(TilingError::config("platform reported core_count == 0"));
    }
    if profile.ub_bytes == 0 {
        return Err(TilingError::config("platform reported ub_bytes == 0"));
    }

    let analysis = op.analyze(profile)?;
    let plan = op.partition(&analysis, profile)?;
    debug_assert!(plan.used_cores <= profile.core_count);

    // Empty tensors use zero cores and skip budgeting entirely.
    let (main_budget, tail_budget) = if plan.used_cores == 0 {
        (BudgetPlan::IDLE, BudgetPlan::IDLE)
    } else {
        let main = op.budget(&analysis, plan.per_core_count, profile)?;
        let tail = op.budget(&analysis, plan.tail_count, profile)?;
        (main, tail)
    };

    let mut descriptor = TilingDescriptor::new();
    descriptor.push_i64(analysis.normalized.total_work_units);
    descriptor.push_i64(analysis.normalized.inner_group_len);
    descriptor.push_i64(plan.per_core_count);
    descriptor.push_i64(plan.tail_count);
    descriptor.push_i64(main_budget.chunk_elems);
    descriptor.push_i64(main_budget.loops_per_core);
    descriptor.push_i64(main_budget.last_chunk_elems);
    descriptor.push_i64(tail_budget.loops_per_core);
    descriptor.push_i64(tail_budget.last_chunk_elems);
    op.extend_descriptor(&analysis, profile, &mut descriptor)?;

    let workspace_bytes = analysis.normalized.total_work_units as u64
        * analysis.per_unit_workspace_elems as u64
        * analysis.elem_bytes as u64
        + profile.workspace_reserve;

    debug!(
        "{}: key={} used_cores={} per_core={} tail={} chunk={} loops={} workspace={}",
        op.name(),
        analysis.tiling_key,
        plan.used_cores,
        plan.per_core_count,
        plan.tail_count,
        main_budget.chunk_elems,
        main_budget.loops_per_core,
        workspace_bytes
    );

    Ok(TilingOutput {
        descriptor,
        tiling_key: analysis.tiling_key,
        used_cores: plan.used_cores,
        workspace_bytes,
        partition: plan,
        main_budget,
        tail_budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{NormalizedShape, TensorShape};

    /// Minimal elementwise strategy for exercising the skeleton.
    struct Identity {
        shape: TensorShape,
    }

    impl TilingStrategy for Identity {
        fn name(&self) -> &'static str {
            "identity"
        }

        fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
            Ok(OpAnalysis {
                normalized: NormalizedShape::elementwise(&self.shape),
                elem_bytes: 4,
                buffer_multiplier: 2,
                align_bytes: 32,
                tiling_key: 1,
                per_unit_workspace_elems: 0,
            })
        }
    }

    #[test]
    fn descriptor_prefix_matches_plans() {
        let profile = HardwareProfile::aiv48();
        let op = Identity { shape: TensorShape::new(&[96, 100]).unwrap() };
        let out = run(&profile, &op).unwrap();
        assert_eq!(out.used_cores, 48);
        let w = out.descriptor.words();
        assert_eq!(w[0], 9600);
        assert_eq!(w[2], out.partition.per_core_count as u64);
        assert_eq!(w[3], out.partition.tail_count as u64);
        assert_eq!(w[5], out.main_budget.loops_per_core as u64);
    }

    #[test]
    fn empty_tensor_skips_budget() {
        let profile = HardwareProfile::aiv48();
        let op = Identity { shape: TensorShape::new(&[0, 100]).unwrap() };
        let out = run(&profile, &op).unwrap();
        assert_eq!(out.used_cores, 0);
        assert_eq!(out.main_budget, BudgetPlan::IDLE);
        assert_eq!(out.workspace_bytes, profile.workspace_reserve);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let profile = HardwareProfile::aiv64();
        let op = Identity { shape: TensorShape::new(&[3, 500, 500]).unwrap() };
        let a = run(&profile, &op).unwrap();
        let b = run(&profile, &op).unwrap();
        assert_eq!(a, b);
        let mut buf_a = vec![0u8; a.descriptor.byte_len()];
        let mut buf_b = vec![0u8; b.descriptor.byte_len()];
        a.descriptor.serialize_into(&mut buf_a).unwrap();
        b.descriptor.serialize_into(&mut buf_b).unwrap();
        assert_eq!(buf_a, buf_b);
    }
}
