use std::sync::Arc;

use enough::Stop;

use crate::buffer::PixelBuffer;
use crate::error::SnapError;
use crate::geom::IRect;
use crate::pixel::{AlphaMode, PixelFormat};

/// An immutable, shareable handle to a fixed set of pixels.
///
/// Images are produced by [`crate::Surface::snapshot`] or by decoding an
/// encoded stream. The pixel store is `Arc`-shared and tightly packed RGBA8;
/// cloning an `Image` is O(1) and an `Image` stays valid after the surface
/// or byte buffer that produced it is gone. No operation mutates an image's
/// pixels after construction.
#[derive(Clone, Debug)]
pub struct Image {
    width: u32,
    height: u32,
    alpha: AlphaMode,
    pixels: Arc<Vec<u8>>,
}

impl Image {
    /// Construct an image from tightly packed RGBA8 pixels.
    ///
    /// `pixels.len()` must be exactly `width * height * 4`.
    pub fn from_pixels(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        alpha: AlphaMode,
    ) -> Result<Self, SnapError> {
        Self::from_shared(Arc::new(pixels), width, height, alpha)
    }

    /// Construct from an already-shared pixel store (snapshot path).
    pub(crate) fn from_shared(
        pixels: Arc<Vec<u8>>,
        width: u32,
        height: u32,
        alpha: AlphaMode,
    ) -> Result<Self, SnapError> {
        if width == 0 || height == 0 {
            return Err(SnapError::InvalidDimensions { width, height });
        }
        let needed = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;
        if pixels.len() != needed {
            return Err(SnapError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            alpha,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha.is_opaque()
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    /// The tightly packed RGBA8 pixel bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Copy `dest.width() x dest.height()` pixels starting at
    /// `(src_x, src_y)` in this image into `dest`, converting into the
    /// destination's format and alpha convention.
    ///
    /// Returns `false` — with `dest` untouched — if the requested rectangle
    /// falls outside the image or the conversion is unsupported. The only
    /// unsupported conversion in the packed-RGBA family is premultiplied
    /// source to opaque destination, which would discard coverage.
    pub fn read_pixels(&self, dest: &mut PixelBuffer, src_x: i32, src_y: i32) -> bool {
        let rect = IRect::from_xywh(src_x, src_y, dest.width(), dest.height());
        if !rect.contained_in(self.width, self.height) {
            return false;
        }
        if self.alpha == AlphaMode::Premultiplied && dest.alpha_mode() == AlphaMode::Opaque {
            return false;
        }

        let swizzle = dest.format() == PixelFormat::Bgra8;
        let w = dest.width() as usize;
        for dy in 0..dest.height() {
            let src_row = self.row(src_y as u32 + dy);
            let src = &src_row[src_x as usize * 4..(src_x as usize + w) * 4];
            let dst = dest.row_mut(dy);
            if swizzle {
                for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
                    d[0] = s[2];
                    d[1] = s[1];
                    d[2] = s[0];
                    d[3] = s[3];
                }
            } else {
                dst.copy_from_slice(src);
            }
        }
        true
    }

    /// Encode this image to a self-contained compressed stream with the
    /// default tile size. See [`crate::EncodeRequest`] for control over
    /// tiling.
    pub fn encode(&self, stop: impl Stop) -> Result<Vec<u8>, SnapError> {
        crate::codec::EncodeRequest::new().encode(self, stop)
    }

    /// Decode a full image from an encoded stream.
    pub fn decode(data: &[u8], stop: impl Stop) -> Result<Image, SnapError> {
        crate::codec::DecodeRequest::new(data).decode(stop)
    }

    /// Decode only the pixels within `rect` from an encoded stream,
    /// producing an image of `rect`'s dimensions.
    pub fn decode_subset(data: &[u8], rect: IRect, stop: impl Stop) -> Result<Image, SnapError> {
        crate::codec::DecodeRequest::new(data)
            .bounded_to(rect)
            .decode(stop)
    }

    /// Typed view of the pixel data.
    #[cfg(feature = "rgb")]
    pub fn as_rgba(&self) -> &[rgb::RGBA8] {
        use rgb::AsPixels as _;
        self.pixels().as_pixels()
    }

    /// Zero-copy [`imgref::ImgRef`] view of the pixel data.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::RGBA8> {
        imgref::ImgRef::new(self.as_rgba(), self.width as usize, self.height as usize)
    }
}
