use enough::StopReason;

use crate::geom::IRect;
use crate::pixel::{AlphaMode, PixelFormat};

/// Errors from surface creation, snapshot read-back, and codec operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SnapError {
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("accelerated backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("encode failed: {0}")]
    EncodeFailed(String),

    #[error("gpu read-back failed: {0}")]
    ReadbackFailed(String),

    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    #[error("subset rectangle {rect:?} not contained in {width}x{height}")]
    InvalidSubset {
        rect: IRect,
        width: u32,
        height: u32,
    },

    #[error(
        "unsupported pixel conversion: {src_format:?}/{src_alpha:?} -> {dst_format:?}/{dst_alpha:?}"
    )]
    FormatMismatch {
        src_format: PixelFormat,
        src_alpha: AlphaMode,
        dst_format: PixelFormat,
        dst_alpha: AlphaMode,
    },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for SnapError {
    fn from(r: StopReason) -> Self {
        SnapError::Cancelled(r)
    }
}
