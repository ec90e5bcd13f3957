//! Caps on what a decode is allowed to cost before any pixel work happens.

use crate::error::SnapError;

/// Resource caps enforced by [`DecodeRequest`](crate::DecodeRequest).
///
/// Dimension caps apply to the dimensions the stream header *declares*, and
/// are checked before any tile is decompressed. The output cap applies to the
/// buffer the decode actually allocates — the requested window for a subset
/// decode — so a tight `max_output_bytes` still admits small windows into a
/// large image. `None` means uncapped.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Largest accepted value for either declared image axis.
    pub max_dimension: Option<u32>,
    /// Largest accepted declared pixel count (width × height).
    pub max_pixels: Option<u64>,
    /// Largest output buffer the decode may allocate, in bytes.
    pub max_output_bytes: Option<u64>,
}

impl Limits {
    /// Validate the dimensions a stream header declares.
    pub(crate) fn check_stream(&self, width: u32, height: u32) -> Result<(), SnapError> {
        if let Some(max) = self.max_dimension {
            let longest = width.max(height);
            if longest > max {
                return Err(SnapError::LimitExceeded(format!(
                    "declared dimension {longest} exceeds cap {max}"
                )));
            }
        }
        if let Some(max) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max {
                return Err(SnapError::LimitExceeded(format!(
                    "declared pixel count {pixels} exceeds cap {max}"
                )));
            }
        }
        Ok(())
    }

    /// Validate the size of the decode's output allocation.
    pub(crate) fn check_output(&self, bytes: usize) -> Result<(), SnapError> {
        if let Some(max) = self.max_output_bytes {
            if bytes as u64 > max {
                return Err(SnapError::LimitExceeded(format!(
                    "output of {bytes} bytes exceeds cap {max}"
                )));
            }
        }
        Ok(())
    }
}
