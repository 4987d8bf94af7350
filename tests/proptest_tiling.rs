//! Property-based tests for the tiling core.
//!
//! Uses proptest to verify the invariants that must hold for all inputs:
//! - Partition coverage: no work units lost or duplicated
//! - Non-overlap: per-core ranges tile the index space
//! - Grouped counts stay multiples of the inner group length
//! - Budget coverage and chunk alignment
//! - Scratch safety under the buffer multiplier
//! - Pipeline determinism

use proptest::prelude::*;

use aicore_tiling::ops::CastTiling;
use aicore_tiling::{
    budget, partition, partition_aligned, pipeline, DType, HardwareProfile, TensorShape,
    TilingError,
};

// ═══════════════════════════════════════════════════════════════════════
// 1. Partition: coverage, non-overlap, tail concentration
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    /// Sum of per-core assignments equals the total exactly.
    #[test]
    fn prop_partition_coverage(total in 0i64..1_000_000_000, cores in 1u32..=128) {
        let plan = partition(total, 1, cores).unwrap();
        let sum: i64 = (0..plan.used_cores).map(|c| plan.assigned(c)).sum();
        prop_assert_eq!(sum, total);
        prop_assert!(plan.used_cores <= cores);
    }

    /// Per-core ranges are pairwise disjoint and collectively contiguous
    /// over [0, total).
    #[test]
    fn prop_partition_ranges_tile(total in 0i64..10_000_000, cores in 1u32..=128) {
        let plan = partition(total, 1, cores).unwrap();
        let mut next = 0i64;
        for core in 0..plan.used_cores {
            let (start, end) = plan.range(core);
            prop_assert_eq!(start, next);
            prop_assert!(end >= start);
            next = end;
        }
        prop_assert_eq!(next, total);
    }

    /// All remainder lands on the single tail core; every other core holds
    /// the identical even share.
    #[test]
    fn prop_remainder_concentrated(total in 1i64..10_000_000, cores in 1u32..=128) {
        let plan = partition(total, 1, cores).unwrap();
        for core in 0..plan.used_cores.saturating_sub(1) {
            prop_assert_eq!(plan.assigned(core), plan.per_core_count);
        }
    }

    /// With an inner group, every assignment is an exact multiple of it.
    #[test]
    fn prop_grouped_counts_are_multiples(
        groups in 0i64..100_000,
        inner in 1i64..=512,
        cores in 1u32..=128,
    ) {
        let plan = partition(groups * inner, inner, cores).unwrap();
        for core in 0..plan.used_cores {
            prop_assert_eq!(plan.assigned(core) % inner, 0);
        }
        let sum: i64 = (0..plan.used_cores).map(|c| plan.assigned(c)).sum();
        prop_assert_eq!(sum, groups * inner);
    }

    /// The aligned variant also covers exactly and respects its alignment
    /// on every non-tail core.
    #[test]
    fn prop_aligned_partition_covers(
        total in 0i64..100_000_000,
        align_pow in 0u32..=9,
        cores in 1u32..=128,
    ) {
        let align = 1i64 << align_pow;
        let plan = partition_aligned(total, align, align, cores).unwrap();
        let sum: i64 = (0..plan.used_cores).map(|c| plan.assigned(c)).sum();
        prop_assert_eq!(sum, total);
        prop_assert_eq!(plan.per_core_count % align, 0);
        prop_assert!(plan.used_cores <= cores);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Budget: coverage, alignment, scratch safety
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn prop_budget_covers_and_aligns(
        per_core in 1i64..100_000_000,
        elem_pow in 0u32..=3,
        scratch in 64u64..=1_048_576,
        mult in 1u32..=4,
    ) {
        let elem_bytes = 1u32 << elem_pow;
        match budget(per_core, elem_bytes, scratch, mult, 32) {
            Ok(plan) => {
                let covered = (plan.loops_per_core - 1) * plan.chunk_elems
                    + plan.last_chunk_elems;
                prop_assert_eq!(covered, per_core);
                let align_unit = (32 / elem_bytes).max(1) as i64;
                prop_assert_eq!(plan.chunk_elems % align_unit, 0);
                prop_assert!(plan.last_chunk_elems >= 1);
                prop_assert!(plan.last_chunk_elems <= plan.chunk_elems);
                // Scratch safety, the hard device constraint.
                prop_assert!(
                    plan.chunk_elems as u64 * elem_bytes as u64 * mult as u64 <= scratch
                );
            }
            Err(TilingError::InsufficientScratch { .. }) => {
                // Legal only when not even one aligned chunk fits.
                let align_unit = (32 / elem_bytes).max(1) as u64;
                prop_assert!((scratch / mult as u64 / elem_bytes as u64) < align_unit);
            }
            Err(e) => return Err(TestCaseError::fail(format!("unexpected error {e}"))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Pipeline determinism: byte-identical descriptors for equal inputs
// ═══════════════════════════════════════════════════════════════════════

fn arb_shape() -> impl Strategy<Value = TensorShape> {
    prop::collection::vec(1i64..=64, 1..=4)
        .prop_map(|dims| TensorShape::new(&dims).unwrap())
}

proptest! {
    #[test]
    fn prop_pipeline_is_deterministic(shape in arb_shape()) {
        let profile = HardwareProfile::aiv48();
        let op = CastTiling { input: shape, src: DType::F16, dst: DType::F32 };
        let a = pipeline::run(&profile, &op).unwrap();
        let b = pipeline::run(&profile, &op).unwrap();
        prop_assert_eq!(&a, &b);
        let mut buf_a = vec![0u8; a.descriptor.byte_len()];
        let mut buf_b = vec![0u8; b.descriptor.byte_len()];
        a.descriptor.serialize_into(&mut buf_a).unwrap();
        b.descriptor.serialize_into(&mut buf_b).unwrap();
        prop_assert_eq!(buf_a, buf_b);
    }

    /// used_cores never exceeds the profile's core count, across profiles.
    #[test]
    fn prop_used_cores_bounded(shape in arb_shape(), cores in 1u32..=64) {
        let profile = HardwareProfile::new(cores, 192 * 1024).unwrap();
        let op = CastTiling { input: shape, src: DType::F32, dst: DType::F16 };
        let out = pipeline::run(&profile, &op).unwrap();
        prop_assert!(out.used_cores <= cores);
        prop_assert_eq!(out.partition.total(), shape.elem_count());
    }
}
