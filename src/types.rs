//! Element data types as seen by the tiling planner.
//!
//! The planner only cares about byte width and a small dispatch code; the
//! numeric semantics of each type live entirely in the device kernels.

use std::fmt;

use crate::error::{TilingError, TilingResult};

/// Tensor element data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F16,
    BF16,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Bool,
}

/// Integer and bool types, used for fill-value routing and branch selection.
pub const INT_OR_BOOL_DTYPES: &[DType] = &[
    DType::I8,
    DType::U8,
    DType::I16,
    DType::U16,
    DType::I32,
    DType::U32,
    DType::I64,
    DType::U64,
    DType::Bool,
];

/// Floating-point types.
pub const FLOAT_DTYPES: &[DType] = &[DType::F32, DType::F16, DType::BF16];

impl DType {
    /// Size in bytes per element.
    pub const fn size_bytes(self) -> u32 {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::BF16 | Self::I16 | Self::U16 => 2,
            Self::I8 | Self::U8 | Self::Bool => 1,
            Self::I64 | Self::U64 => 8,
        }
    }

    /// Stable dispatch code used in tiling keys. Must stay in lockstep with
    /// the device kernel variant tables.
    pub const fn code(self) -> u8 {
        match self {
            Self::F32 => 0,
            Self::F16 => 1,
            Self::BF16 => 2,
            Self::I8 => 3,
            Self::U8 => 4,
            Self::I16 => 5,
            Self::U16 => 6,
            Self::I32 => 7,
            Self::U32 => 8,
            Self::I64 => 9,
            Self::U64 => 10,
            Self::Bool => 11,
        }
    }

    /// All variants, in `code()` order.
    pub const ALL: [DType; 12] = [
        Self::F32,
        Self::F16,
        Self::BF16,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::Bool,
    ];

    pub fn is_float(self) -> bool {
        FLOAT_DTYPES.contains(&self)
    }

    pub fn is_int_or_bool(self) -> bool {
        INT_OR_BOOL_DTYPES.contains(&self)
    }

    /// Membership check against an operator's supported set.
    pub fn require_in(self, supported: &[DType], op: &str) -> TilingResult<()> {
        if supported.contains(&self) {
            Ok(())
        } else {
            Err(TilingError::DtypeUnsupported(format!(
                "{op} does not support {self}, supported: {supported:?}"
            )))
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::F32 => "float32",
            Self::F16 => "float16",
            Self::BF16 => "bfloat16",
            Self::I8 => "int8",
            Self::U8 => "uint8",
            Self::I16 => "int16",
            Self::U16 => "uint16",
            Self::I32 => "int32",
            Self::U32 => "uint32",
            Self::I64 => "int64",
            Self::U64 => "uint64",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtype_codes_unique() {
        let mut seen = std::collections::HashSet::new();
        for dt in DType::ALL {
            assert!(seen.insert(dt.code()), "duplicate code for {dt}");
        }
    }

    #[test]
    fn dtype_widths() {
        assert_eq!(DType::F16.size_bytes(), 2);
        assert_eq!(DType::Bool.size_bytes(), 1);
        assert_eq!(DType::U64.size_bytes(), 8);
    }

    #[test]
    fn category_sets_are_disjoint_and_total() {
        for dt in DType::ALL {
            assert!(dt.is_float() ^ dt.is_int_or_bool(), "{dt} in both or neither set");
        }
    }

    #[test]
    fn require_in_rejects_outsider() {
        let err = DType::U64.require_in(FLOAT_DTYPES, "cast").unwrap_err();
        assert!(matches!(err, TilingError::DtypeUnsupported(_)));
    }
}
