//! Error taxonomy for the tiling pipeline.
//!
//! Every stage returns `TilingResult`; the pipeline stops at the first
//! failure and never emits a partial descriptor. A failed tiling for one
//! operator node must not affect sibling nodes, so no error here carries
//! shared state.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TilingError {
    /// Rank below the operator's minimum, an unknown (-1) dynamic dim, or a
    /// violated shape identity such as `out != in + before + after`.
    #[error("shape error: {0}")]
    Shape(String),

    /// Platform reported zero cores or zero scratch bytes. Indicates a
    /// misconfigured or unsupported device; not retryable.
    #[error("invalid hardware configuration: {0}")]
    Configuration(String),

    /// On-chip scratch cannot hold even one aligned chunk of this element
    /// type. Deterministic for given inputs, so never retried.
    #[error("scratch memory too small: need at least {needed} bytes, have {available}")]
    InsufficientScratch { needed: u64, available: u64 },

    /// Serialized descriptor would overflow the caller-provided buffer.
    /// A mismatch between declared and actual layout; programming error.
    #[error("descriptor capacity exceeded: {required} bytes into {capacity}-byte buffer")]
    Capacity { required: usize, capacity: usize },

    /// Data type outside the operator's supported set.
    #[error("unsupported dtype: {0}")]
    DtypeUnsupported(String),
}

pub type TilingResult<T> = Result<T, TilingError>;

impl TilingError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        TilingError::Shape(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        TilingError::Configuration(msg.into())
    }
}
