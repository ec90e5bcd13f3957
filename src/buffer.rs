use crate::error::SnapError;
use crate::pixel::{AlphaMode, PixelFormat};

/// A caller-owned, flat strided pixel region used as a read-back or decode
/// destination.
///
/// The buffer owns `stride * height` bytes exclusively. Row accessors expose
/// exactly `width * bytes_per_pixel` bytes per row; any stride padding is
/// never read or compared.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    alpha: AlphaMode,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a tightly packed buffer (stride = width * bytes_per_pixel).
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        alpha: AlphaMode,
    ) -> Result<Self, SnapError> {
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;
        Self::with_stride(width, height, stride, format, alpha)
    }

    /// Allocate a buffer with an explicit row stride in bytes.
    pub fn with_stride(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        alpha: AlphaMode,
    ) -> Result<Self, SnapError> {
        if width == 0 || height == 0 {
            return Err(SnapError::InvalidDimensions { width, height });
        }
        let min_stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;
        if stride < min_stride {
            return Err(SnapError::BufferTooSmall {
                needed: min_stride,
                actual: stride,
            });
        }
        let total = stride
            .checked_mul(height as usize)
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            stride,
            format,
            alpha,
            data: vec![0; total],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    /// The `width * bytes_per_pixel` payload bytes of row `y`.
    ///
    /// Panics if `y >= height`; rows are always addressed by in-bounds
    /// indices computed from this buffer's own dimensions.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &self.data[start..start + len]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &mut self.data[start..start + len]
    }

    /// Full backing storage including stride padding.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reinterpret row `y` as typed RGBA pixels.
    ///
    /// Only valid for `PixelFormat::Rgba8` buffers; `Bgra8` rows would
    /// misreport channel order through the `RGBA8` type.
    #[cfg(feature = "rgb")]
    pub fn row_rgba(&self, y: u32) -> Option<&[rgb::RGBA8]> {
        use rgb::AsPixels as _;
        match self.format {
            PixelFormat::Rgba8 => Some(self.row(y).as_pixels()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        let err = PixelBuffer::new(0, 4, PixelFormat::Rgba8, AlphaMode::Opaque).unwrap_err();
        assert!(matches!(err, SnapError::InvalidDimensions { .. }));
    }

    #[test]
    fn rejects_undersized_stride() {
        let err = PixelBuffer::with_stride(4, 4, 8, PixelFormat::Rgba8, AlphaMode::Opaque)
            .unwrap_err();
        assert!(matches!(err, SnapError::BufferTooSmall { needed: 16, .. }));
    }

    #[test]
    fn row_ignores_stride_padding() {
        let mut buf =
            PixelBuffer::with_stride(2, 2, 12, PixelFormat::Rgba8, AlphaMode::Premultiplied)
                .unwrap();
        buf.row_mut(1).copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(buf.row(1), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(buf.row(0), &[0; 8]);
        assert_eq!(buf.bytes().len(), 24);
    }
}
