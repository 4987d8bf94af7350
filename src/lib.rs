//! aicore-tiling: host-side tiling planner for NPU tensor operators.
//!
//! Maps an N-dimensional tensor operation onto a fixed number of parallel
//! compute cores under a fixed on-chip scratch budget:
//! - **Shape normalization**: collapse rank ≤ 8 shapes into work units and
//!   a contiguity constraint
//! - **Core partitioning**: near-equal per-core shares, remainder
//!   concentrated in one tail unit
//! - **Scratch budgeting**: loop/chunk schedule under a double-buffered,
//!   32-byte-aligned scratch capacity
//! - **Key selection**: a typed, collision-checked kernel-variant mapping
//!
//! The output is a packed [`TilingDescriptor`] plus a tiling key and a
//! used-core count, consumed opaquely by the device kernel. Everything here
//! is pure host-side arithmetic: no device code, no I/O, no hidden state
//! beyond a cached [`HardwareProfile`].
//!
//! # Quick start
//!
//! ```
//! use aicore_tiling::{pipeline, HardwareProfile, TensorShape, DType};
//! use aicore_tiling::ops::{CompareOp, CompareTiling};
//!
//! let shape = TensorShape::new(&[64, 1024]).unwrap();
//! let op = CompareTiling { lhs: shape, rhs: shape, dtype: DType::F16, op: CompareOp::Less };
//! let out = pipeline::run(&HardwareProfile::aiv48(), &op).unwrap();
//! assert_eq!(out.partition.total(), 64 * 1024);
//! ```

pub mod arith;
pub mod budget;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod ops;
pub mod partition;
pub mod pipeline;
pub mod platform;
pub mod shape;
pub mod types;

pub use budget::{budget, BudgetPlan};
pub use descriptor::TilingDescriptor;
pub use error::{TilingError, TilingResult};
pub use key::KeySpace;
pub use partition::{partition, partition_aligned, PartitionPlan};
pub use pipeline::{run, OpAnalysis, TilingOutput, TilingStrategy};
pub use platform::{default_profile, HardwareProfile, BLOCK_BYTES, SYSTEM_WORKSPACE_RESERVE};
pub use shape::{NormalizedShape, PadSpec, SliceSpec, TensorShape, MAX_RANK};
pub use types::DType;
