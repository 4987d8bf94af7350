//! Integer helpers shared by the partitioner and budgeter.
//!
//! All division here is floor division over non-negative operands except
//! `ceil_div`, which must round up so schedules cover their totals exactly.

/// Ceiling division for non-negative operands.
#[inline]
pub const fn ceil_div(a: i64, b: i64) -> i64 {
    (a + b - 1) / b
}

/// Round `a` down to a multiple of `unit`.
#[inline]
pub const fn floor_align(a: i64, unit: i64) -> i64 {
    a / unit * unit
}

/// Round `a` up to a multiple of `unit`.
#[inline]
pub const fn ceil_align(a: i64, unit: i64) -> i64 {
    ceil_div(a, unit) * unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_div_covers() {
        assert_eq!(ceil_div(0, 8), 0);
        assert_eq!(ceil_div(1, 8), 1);
        assert_eq!(ceil_div(8, 8), 1);
        assert_eq!(ceil_div(9, 8), 2);
    }

    #[test]
    fn alignment_roundtrips() {
        assert_eq!(floor_align(100, 32), 96);
        assert_eq!(ceil_align(100, 32), 128);
        assert_eq!(floor_align(96, 32), ceil_align(96, 32));
    }
}
