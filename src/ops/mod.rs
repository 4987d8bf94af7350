//! Per-operator tiling strategies.
//!
//! Each module owns one operator family: its attribute validation, shape
//! checks, key space, and any deviation from the shared partition/budget
//! defaults.

pub mod bernoulli;
pub mod cast;
pub mod circular_pad;
pub mod compare;
pub mod diag_flat;
pub mod dropout;
pub mod floor_mod;
pub mod mem_set;
pub mod strided_slice;

pub use bernoulli::BernoulliTiling;
pub use cast::CastTiling;
pub use circular_pad::CircularPadTiling;
pub use compare::{CompareOp, CompareTiling};
pub use diag_flat::DiagFlatTiling;
pub use dropout::DropoutTiling;
pub use floor_mod::FloorModTiling;
pub use mem_set::MemSetTiling;
pub use strided_slice::StridedSliceTiling;
