//! Hardware profile for tiling decisions.
//!
//! The platform collaborator reports two constants per device: the number of
//! vector cores and the per-core on-chip scratch (UB) capacity. Both are
//! queried once per process and cached; tiling never mutates them.

use std::sync::OnceLock;

use crate::error::{TilingError, TilingResult};

/// Minimum DMA transfer granularity. Every copy in or out of scratch must be
/// a multiple of this, so budgeted chunks are floored to it.
pub const BLOCK_BYTES: u32 = 32;

/// Off-chip workspace reserve required by the runtime system, prepended to
/// every operator's workspace request.
pub const SYSTEM_WORKSPACE_RESERVE: u64 = 16 * 1024 * 1024;

/// Immutable description of one accelerator device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareProfile {
    /// Number of independent vector compute cores.
    pub core_count: u32,
    /// On-chip scratch bytes per core.
    pub ub_bytes: u64,
    /// DMA block granularity in bytes.
    pub block_bytes: u32,
    /// Fixed off-chip workspace reserve in bytes.
    pub workspace_reserve: u64,
}

impl HardwareProfile {
    /// Build a profile, rejecting the zero values a broken platform query
    /// can report.
    pub fn new(core_count: u32, ub_bytes: u64) -> TilingResult<Self> {
        if core_count == 0 {
            return Err(TilingError::config("platform reported core_count == 0"));
        }
        if ub_bytes == 0 {
            return Err(TilingError::config("platform reported ub_bytes == 0"));
        }
        Ok(HardwareProfile {
            core_count,
            ub_bytes,
            block_bytes: BLOCK_BYTES,
            workspace_reserve: SYSTEM_WORKSPACE_RESERVE,
        })
    }

    /// 48 vector cores, 192 KiB UB each.
    pub fn aiv48() -> Self {
        HardwareProfile {
            core_count: 48,
            ub_bytes: 192 * 1024,
            block_bytes: BLOCK_BYTES,
            workspace_reserve: SYSTEM_WORKSPACE_RESERVE,
        }
    }

    /// 64 vector cores, 256 KiB UB each.
    pub fn aiv64() -> Self {
        HardwareProfile {
            core_count: 64,
            ub_bytes: 256 * 1024,
            block_bytes: BLOCK_BYTES,
            workspace_reserve: SYSTEM_WORKSPACE_RESERVE,
        }
    }
}

/// Process-wide default profile, resolved once.
static DEFAULT_PROFILE: OnceLock<HardwareProfile> = OnceLock::new();

/// Returns the cached process-wide profile, defaulting to [`HardwareProfile::aiv48`].
///
/// Tiling for different operator nodes shares this read-only value; there is
/// no other cross-invocation state.
pub fn default_profile() -> &'static HardwareProfile {
    DEFAULT_PROFILE.get_or_init(HardwareProfile::aiv48)
}
