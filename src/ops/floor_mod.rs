//! Floor-mod (Python-style remainder), binary elementwise.
//!
//! Integer inputs are computed through a float intermediate on device, so
//! the integer branch reserves two extra conversion buffers on top of the
//! usual two-inputs-one-output double-buffered set.

use crate::error::{TilingError, TilingResult};
use crate::key::KeySpace;
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

pub const KEY_SPACE: KeySpace = KeySpace::new(600, 2);

const BRANCH_FLOAT: u8 = 0;
const BRANCH_INT: u8 = 1;

pub const SUPPORTED: &[DType] = &[
    DType::F32,
    DType::F16,
    DType::BF16,
    DType::I8,
    DType::U8,
    DType::I32,
    DType::I64,
];

#[derive(Debug, Clone)]
pub struct FloorModTiling {
    pub lhs: TensorShape,
    pub rhs: TensorShape,
    pub dtype: DType,
}

impl TilingStrategy for FloorModTiling {
    fn name(&self) -> &'static str {
        "floor_mod"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        self.dtype.require_in(SUPPORTED, "floor_mod")?;
        if self.lhs != self.rhs {
            return Err(TilingError::shape(format!(
                "floor_mod operands must match: {:?} vs {:?}",
                self.lhs.dims(),
                self.rhs.dims()
            )));
        }
        let is_int = self.dtype.is_int_or_bool();
        // lhs + rhs + out double buffered = 6; int adds two f32 temps.
        let buffer_multiplier = if is_int { 8 } else { 6 };
        let branch = if is_int { BRANCH_INT } else { BRANCH_FLOAT };
        Ok(OpAnalysis {
            normalized: NormalizedShape::elementwise(&self.lhs),
            elem_bytes: self.dtype.size_bytes(),
            buffer_multiplier,
            align_bytes: 32,
            tiling_key: KEY_SPACE.encode(self.dtype.code(), branch),
            per_unit_workspace_elems: 0,
        })
    }
}
