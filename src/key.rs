//! Tiling-key encoding: mapping (dtype code, branch code) pairs to the
//! integer discriminator that selects a compiled device-kernel variant.
//!
//! A missing or colliding key silently dispatches the wrong kernel, so the
//! mapping must be a bijection over each operator's finite variant table.
//! Encoding is `base + type_multiplier * dtype_code + branch_code` with
//! `branch_code < type_multiplier`, which keeps decode exact.

/// An operator's key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpace {
    /// Distinguishes operators; key ranges of different ops must not overlap.
    pub base: u64,
    /// Stride between consecutive dtype codes; also the branch-code bound.
    pub type_multiplier: u64,
}

impl KeySpace {
    pub const fn new(base: u64, type_multiplier: u64) -> Self {
        KeySpace { base, type_multiplier }
    }

    /// Encode a variant. `branch_code` must be `< type_multiplier`.
    pub fn encode(&self, dtype_code: u8, branch_code: u8) -> u64 {
        debug_assert!((branch_code as u64) < self.type_multiplier);
        self.base + self.type_multiplier * dtype_code as u64 + branch_code as u64
    }

    /// Recover `(dtype_code, branch_code)` from a key, or `None` if the key
    /// is below this space's base.
    pub fn decode(&self, key: u64) -> Option<(u8, u8)> {
        let offset = key.checked_sub(self.base)?;
        let dtype = offset / self.type_multiplier;
        let branch = offset % self.type_multiplier;
        Some((dtype as u8, branch as u8))
    }
}
