//! Elementwise comparisons producing a bool tensor.
//!
//! All six predicates share one kernel family; the predicate index rides in
//! the tiling key's branch code. Scratch holds both input chunks plus the
//! one-byte mask chunk, double buffered.

use crate::error::{TilingError, TilingResult};
use crate::key::KeySpace;
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

/// Branch codes 0..6 for the six predicates.
pub const KEY_SPACE: KeySpace = KeySpace::new(700, 8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
    ];

    pub const fn branch_code(self) -> u8 {
        match self {
            Self::Equal => 0,
            Self::NotEqual => 1,
            Self::Less => 2,
            Self::LessEqual => 3,
            Self::Greater => 4,
            Self::GreaterEqual => 5,
        }
    }
}

pub const SUPPORTED: &[DType] = &[
    DType::F32,
    DType::F16,
    DType::BF16,
    DType::I8,
    DType::U8,
    DType::I32,
    DType::I64,
    DType::Bool,
];

#[derive(Debug, Clone)]
pub struct CompareTiling {
    pub lhs: TensorShape,
    pub rhs: TensorShape,
    pub dtype: DType,
    pub op: CompareOp,
}

impl TilingStrategy for CompareTiling {
    fn name(&self) -> &'static str {
        "compare"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.dtype.require_in(SUPPORTED, "compare")?;
        if self.lhs != self.rhs {
            return Err(TilingError::shape(format!(
                "compare operands must match: {:?} vs {:?}",
                self.lhs.dims(),
                self.rhs.dims()
            )));
        }
        // Two input chunks at elem width plus the mask chunk at one byte,
        // double buffered. Folded into a multiplier on the input width, the
        // mask rounds up to one extra input-width buffer.
        Ok(OpAnalysis {
            normalized: NormalizedShape::elementwise(&self.lhs),
            elem_bytes: self.dtype.size_bytes(),
            buffer_multiplier: 6,
            align_bytes: 32,
            tiling_key: KEY_SPACE.encode(self.dtype.code(), self.op.branch_code()),
            per_unit_workspace_elems: 0,
        })
    }
}
