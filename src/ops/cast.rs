//! Elementwise dtype conversion.
//!
//! Only pairs the device has a compiled conversion path for are accepted;
//! anything else is a dtype error, reported separately from shape problems.
//! The key encodes the (src, dst) pair so the dispatcher can pick the exact
//! conversion kernel.

use crate::error::{TilingError, TilingResult};
use crate::key::KeySpace;
use crate::pipeline::{OpAnalysis, TilingStrategy};
use crate::platform::HardwareProfile;
use crate::shape::{NormalizedShape, TensorShape};
use crate::types::DType;

/// dtype = source code, branch = destination code (12 codes < 16).
pub const KEY_SPACE: KeySpace = KeySpace::new(2000, 16);

/// Conversion pairs with a compiled kernel variant.
pub const SUPPORTED_CASTS: &[(DType, DType)] = &[
    (DType::F32, DType::F16),
    (DType::F32, DType::BF16),
    (DType::F32, DType::I32),
    (DType::F32, DType::I64),
    (DType::F32, DType::Bool),
    (DType::F16, DType::F32),
    (DType::F16, DType::BF16),
    (DType::F16, DType::I32),
    (DType::BF16, DType::F32),
    (DType::BF16, DType::F16),
    (DType::I8, DType::F32),
    (DType::I8, DType::F16),
    (DType::I8, DType::I32),
    (DType::U8, DType::F32),
    (DType::U8, DType::F16),
    (DType::U8, DType::I32),
    (DType::I32, DType::F32),
    (DType::I32, DType::I64),
    (DType::I32, DType::I8),
    (DType::I32, DType::Bool),
    (DType::I64, DType::F32),
    (DType::I64, DType::I32),
    (DType::Bool, DType::F32),
    (DType::Bool, DType::F16),
    (DType::Bool, DType::I8),
    (DType::Bool, DType::I32),
];

#[derive(Debug, Clone)]
pub struct CastTiling {
    pub input: TensorShape,
    pub src: DType,
    pub dst: DType,
}

impl TilingStrategy for CastTiling {
    fn name(&self) -> &'static str {
        "cast"
    }

    fn analyze(&self, _profile: &HardwareProfile) -> TilingResult<OpAnalysis> {
        if !SUPPORTED_CASTS.contains(&(self.src, self.dst)) {
            return Err(TilingError::DtypeUnsupported(format!(
                "no conversion kernel for {} -> {}",
                self.src, self.dst
            )));
        }
        // Both the source and destination chunk live in scratch at once, each
        // double buffered; the wider side dominates the budget.
        let elem_bytes = self.src.size_bytes().max(self.dst.size_bytes());
        Ok(OpAnalysis {
            normalized: NormalizedShape::elementwise(&self.input),
            elem_bytes,
            buffer_multiplier: 4,
            align_bytes: 32,
            tiling_key: KEY_SPACE.encode(self.src.code(), self.dst.code()),
            per_unit_workspace_elems: 0,
        })
    }
}
